use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ratatui::style::{Color, Modifier, Style};

use super::GameModule;
use crate::cabinet::{Action, GameContext, RenderSurface, Resolution, ScoreReport, Services};

const WIDTH: u16 = 60;
const HEIGHT: u16 = 24;
const BRICK_ROWS: usize = 6;
const BRICKS_PER_ROW: usize = 12;
const BRICK_TOP: f32 = 3.0;
const PADDLE_WIDTH: f32 = 10.0;
const PADDLE_Y: f32 = HEIGHT as f32 - 2.0;
const START_LIVES: u32 = 3;
/// Physics runs in fixed 60 Hz frames; speeds below are cells per frame.
const FRAME: f32 = 1.0 / 60.0;
const START_SPEED: f32 = 0.35;
const MAX_SPEED: f32 = 0.7;

const BACKGROUND: Color = Color::Rgb(10, 10, 20);

pub const MODULE: GameModule = GameModule {
    id: "breakout",
    title: "Breakout",
    resolution: Resolution::new(WIDTH, HEIGHT),
    controls: &[
        ("← / →", "Move paddle"),
        ("Space", "Launch ball"),
        ("P", "Pause"),
        ("Esc", "Menu"),
    ],
    instructions: "Smash every brick with the ball. Higher rows are worth more. \
                   You have three balls.",
    init,
};

fn init(ctx: &mut GameContext<'_>) -> anyhow::Result<()> {
    let game = Rc::new(RefCell::new(Breakout::new()));
    game.borrow().draw(ctx.surface());

    let controls = Rc::clone(&game);
    let binding = ctx.bind_input(move |event, _| {
        if let Some(action) = event.action() {
            controls.borrow_mut().handle(action);
        }
    });
    ctx.register_cleanup("breakout input", move || {
        binding.cancel();
        Ok(())
    });

    let stepping = Rc::clone(&game);
    let frame_loop =
        ctx.start_loop(move |elapsed, services| stepping.borrow_mut().advance(elapsed, services))?;
    ctx.register_cleanup("breakout loop", move || {
        frame_loop.cancel();
        Ok(())
    });
    Ok(())
}

#[derive(Clone)]
struct Brick {
    x: f32,
    y: f32,
    width: f32,
    alive: bool,
    color: Color,
    points: u32,
}

struct Breakout {
    paddle_x: f32,
    ball_x: f32,
    ball_y: f32,
    ball_dx: f32,
    ball_dy: f32,
    ball_speed: f32,
    bricks: Vec<Brick>,
    lives: u32,
    launched: bool,
    paused: bool,
    finished: bool,
    /// Unsimulated time carried to the next frame.
    backlog: f32,
}

impl Breakout {
    fn new() -> Self {
        let paddle_x = WIDTH as f32 / 2.0 - PADDLE_WIDTH / 2.0;
        let mut game = Self {
            paddle_x,
            ball_x: WIDTH as f32 / 2.0,
            ball_y: PADDLE_Y - 1.0,
            ball_dx: START_SPEED,
            ball_dy: -START_SPEED,
            ball_speed: START_SPEED,
            bricks: Vec::new(),
            lives: START_LIVES,
            launched: false,
            paused: false,
            finished: false,
            backlog: 0.0,
        };
        game.init_bricks();
        game
    }

    fn init_bricks(&mut self) {
        let colors = [
            Color::Rgb(220, 50, 50),
            Color::Rgb(220, 130, 30),
            Color::Rgb(220, 200, 30),
            Color::Rgb(50, 200, 50),
            Color::Rgb(50, 130, 220),
            Color::Rgb(150, 50, 220),
        ];
        let points = [60, 50, 40, 30, 20, 10];
        let brick_width = WIDTH as f32 / BRICKS_PER_ROW as f32;
        self.bricks = (0..BRICK_ROWS)
            .flat_map(|row| {
                (0..BRICKS_PER_ROW).map(move |col| Brick {
                    x: col as f32 * brick_width,
                    y: BRICK_TOP + row as f32,
                    width: brick_width,
                    alive: true,
                    color: colors[row % colors.len()],
                    points: points[row % points.len()],
                })
            })
            .collect();
    }

    fn handle(&mut self, action: Action) {
        if self.finished {
            return;
        }
        if action == Action::Pause {
            self.paused = !self.paused;
            return;
        }
        if self.paused {
            return;
        }
        match action {
            Action::Left => {
                self.paddle_x = (self.paddle_x - 2.0).max(0.0);
            }
            Action::Right => {
                self.paddle_x = (self.paddle_x + 2.0).min(WIDTH as f32 - PADDLE_WIDTH);
            }
            Action::Primary | Action::Up if !self.launched => {
                self.launched = true;
                self.ball_dy = -self.ball_speed;
                self.ball_dx = self.ball_speed * 0.7;
            }
            _ => {}
        }
    }

    fn advance(&mut self, elapsed: Duration, services: &mut Services) -> anyhow::Result<()> {
        if !self.paused && !self.finished {
            self.backlog = (self.backlog + elapsed.as_secs_f32()).min(0.25);
            while self.backlog >= FRAME && !self.finished {
                self.backlog -= FRAME;
                self.move_ball(services);
            }
        }
        self.draw(services.surface_mut());
        Ok(())
    }

    fn reset_ball(&mut self) {
        self.ball_dx = self.ball_speed;
        self.ball_dy = -self.ball_speed;
        self.launched = false;
    }

    fn move_ball(&mut self, services: &mut Services) {
        if !self.launched {
            self.ball_x = self.paddle_x + PADDLE_WIDTH / 2.0;
            self.ball_y = PADDLE_Y - 1.0;
            return;
        }

        self.ball_x += self.ball_dx;
        self.ball_y += self.ball_dy;

        let right = WIDTH as f32 - 1.0;
        if self.ball_x <= 0.0 {
            self.ball_x = 0.0;
            self.ball_dx = self.ball_dx.abs();
        }
        if self.ball_x >= right {
            self.ball_x = right;
            self.ball_dx = -self.ball_dx.abs();
        }
        // row 0 is the status line
        if self.ball_y <= 1.0 {
            self.ball_y = 1.0;
            self.ball_dy = self.ball_dy.abs();
        }

        if self.ball_y >= HEIGHT as f32 {
            self.lives = self.lives.saturating_sub(1);
            services.play_sound("miss");
            if self.lives == 0 {
                self.finished = true;
                services.report_game_over();
            } else {
                self.reset_ball();
            }
            return;
        }

        if self.ball_dy > 0.0
            && self.ball_y >= PADDLE_Y - 0.5
            && self.ball_y <= PADDLE_Y + 1.0
            && self.ball_x >= self.paddle_x - 0.5
            && self.ball_x <= self.paddle_x + PADDLE_WIDTH + 0.5
        {
            self.ball_dy = -self.ball_dy.abs();
            let hit_pos = (self.ball_x - self.paddle_x) / PADDLE_WIDTH;
            self.ball_dx = self.ball_speed * (hit_pos - 0.5) * 3.0;
            if self.ball_dy.abs() < 0.15 {
                self.ball_dy = -0.15;
            }
            let limit = self.ball_speed * 1.5;
            if self.ball_dx.abs() > limit {
                self.ball_dx = self.ball_dx.signum() * limit;
            }
            services.play_sound("bounce");
        }

        let hit = self.bricks.iter().position(|brick| {
            brick.alive
                && self.ball_x >= brick.x - 0.5
                && self.ball_x < brick.x + brick.width + 0.5
                && self.ball_y >= brick.y - 0.5
                && self.ball_y < brick.y + 1.0
        });
        if let Some(idx) = hit {
            let brick = &self.bricks[idx];
            let dx = self.ball_x - (brick.x + brick.width / 2.0);
            let dy = self.ball_y - (brick.y + 0.5);
            if dx.abs() / brick.width > dy.abs() {
                self.ball_dx = -self.ball_dx;
            } else {
                self.ball_dy = -self.ball_dy;
            }
            services.report_score(ScoreReport::Delta(brick.points as i64));
            services.play_sound("brick");
            self.bricks[idx].alive = false;
            self.ball_speed = (self.ball_speed + 0.003).min(MAX_SPEED);

            if self.bricks.iter().all(|b| !b.alive) {
                self.finished = true;
                services.play_sound("cleared");
                services.report_game_over();
            }
        }
    }

    fn draw(&self, surface: &mut RenderSurface) {
        let bg = Style::default().bg(BACKGROUND);
        surface.fill(bg);

        let left = self.bricks.iter().filter(|b| b.alive).count();
        let status = format!(
            " Lives: {}  Bricks: {}/{}",
            "♥ ".repeat(self.lives as usize),
            left,
            self.bricks.len()
        );
        let status_style = bg.fg(Color::Rgb(255, 120, 120)).add_modifier(Modifier::BOLD);
        surface.text(0, 0, &status, status_style);

        for brick in self.bricks.iter().filter(|b| b.alive) {
            let start = brick.x as i32;
            let end = (brick.x + brick.width) as i32;
            for x in start..end {
                let ch = if x == start {
                    '▐'
                } else if x + 1 == end {
                    '▌'
                } else {
                    '█'
                };
                surface.put(x, brick.y as i32, ch, bg.fg(brick.color));
            }
        }

        let start = self.paddle_x as i32;
        let end = (self.paddle_x + PADDLE_WIDTH) as i32;
        let paddle = Style::default()
            .fg(Color::Rgb(180, 200, 255))
            .bg(Color::Rgb(30, 50, 120))
            .add_modifier(Modifier::BOLD);
        for x in start..end {
            let ch = if x == start || x + 1 == end { '▓' } else { '═' };
            surface.put(x, PADDLE_Y as i32, ch, paddle);
        }

        surface.put(
            self.ball_x as i32,
            self.ball_y as i32,
            '●',
            bg.fg(Color::White).add_modifier(Modifier::BOLD),
        );

        let hint = if self.paused {
            Some(" PAUSED - P to resume ")
        } else if !self.launched && !self.finished {
            Some(" SPACE to launch ")
        } else {
            None
        };
        if let Some(hint) = hint {
            surface.text_centered(
                HEIGHT as i32 / 2 + 2,
                hint,
                Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 0)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cabinet::services::Request;
    use crate::cabinet::AudioService;

    fn services() -> Services {
        let mut services = Services::new(AudioService::silent());
        services.surface_mut().resize(MODULE.resolution);
        services
    }

    #[test]
    fn ball_rides_the_paddle_until_launched() {
        let mut services = services();
        let mut game = Breakout::new();
        game.handle(Action::Left);
        game.advance(Duration::from_millis(100), &mut services).unwrap();
        assert_eq!(game.ball_x, game.paddle_x + PADDLE_WIDTH / 2.0);
        assert!(!game.launched);

        game.handle(Action::Primary);
        assert!(game.launched);
        assert!(game.ball_dy < 0.0);
    }

    #[test]
    fn brick_hit_scores_its_points() {
        let mut services = services();
        let mut game = Breakout::new();
        game.launched = true;
        // just below the bottom row, moving up
        game.ball_x = 2.0;
        game.ball_y = BRICK_TOP + BRICK_ROWS as f32 + 0.1;
        game.ball_dx = 0.0;
        game.ball_dy = -0.35;

        game.move_ball(&mut services);
        assert_eq!(services.score(), 10);
        assert!(!game.bricks[(BRICK_ROWS - 1) * BRICKS_PER_ROW].alive);
        assert!(game.ball_dy > 0.0);
    }

    #[test]
    fn losing_the_last_ball_ends_the_game() {
        let mut services = services();
        let mut game = Breakout::new();
        game.lives = 1;
        game.launched = true;
        game.paddle_x = 0.0;
        game.ball_x = WIDTH as f32 - 5.0;
        game.ball_y = HEIGHT as f32 - 0.2;
        game.ball_dx = 0.0;
        game.ball_dy = 0.35;

        game.move_ball(&mut services);
        assert!(game.finished);
        assert_eq!(services.take_requests(), vec![Request::GameOver]);
    }
}
