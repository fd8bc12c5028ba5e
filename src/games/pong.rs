use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;
use ratatui::style::{Color, Modifier, Style};

use super::GameModule;
use crate::cabinet::{
    Action, GameContext, InputEvent, PointerKind, RenderSurface, Resolution, ScoreReport, Services,
};

const WIDTH: u16 = 60;
const HEIGHT: u16 = 20;
const PADDLE_HEIGHT: f32 = 4.0;
const PLAYER_X: f32 = 2.0;
const CPU_X: f32 = WIDTH as f32 - 3.0;
const SERVE_SPEED: f32 = 22.0;
const MAX_SPEED: f32 = 60.0;
const CPU_SPEED: f32 = 11.0;
const WINNING_POINTS: u32 = 7;
const SPEED_UP_EVERY: Duration = Duration::from_secs(5);

const BACKGROUND: Color = Color::Rgb(5, 5, 20);

pub const MODULE: GameModule = GameModule {
    id: "pong",
    title: "Pong",
    resolution: Resolution::new(WIDTH, HEIGHT),
    controls: &[
        ("↑ ↓ / W S", "Move paddle"),
        ("Mouse drag", "Move paddle"),
        ("P", "Pause"),
        ("Esc", "Menu"),
    ],
    instructions: "First to 7 points wins. The rally gets faster the longer it lasts.",
    init,
};

fn init(ctx: &mut GameContext<'_>) -> anyhow::Result<()> {
    let game = Rc::new(RefCell::new(Pong::new()));
    game.borrow().draw(ctx.surface());

    let controls = Rc::clone(&game);
    let binding = ctx.bind_input(move |event, _| controls.borrow_mut().handle(event));
    ctx.register_cleanup("pong input", move || {
        binding.cancel();
        Ok(())
    });

    let rally = Rc::clone(&game);
    let speed_up = ctx.set_interval(SPEED_UP_EVERY, move |_| rally.borrow_mut().speed_up());
    ctx.register_cleanup("pong speed-up timer", move || {
        speed_up.cancel();
        Ok(())
    });

    let stepping = Rc::clone(&game);
    let frame_loop =
        ctx.start_loop(move |elapsed, services| stepping.borrow_mut().advance(elapsed, services))?;
    ctx.register_cleanup("pong loop", move || {
        frame_loop.cancel();
        Ok(())
    });
    Ok(())
}

struct Pong {
    /// Top edge of each paddle.
    player_y: f32,
    cpu_y: f32,
    ball: (f32, f32),
    velocity: (f32, f32),
    player_points: u32,
    cpu_points: u32,
    paused: bool,
    finished: bool,
}

impl Pong {
    fn new() -> Self {
        let mid = (HEIGHT as f32 - PADDLE_HEIGHT) / 2.0;
        let mut pong = Self {
            player_y: mid,
            cpu_y: mid,
            ball: (0.0, 0.0),
            velocity: (0.0, 0.0),
            player_points: 0,
            cpu_points: 0,
            paused: false,
            finished: false,
        };
        pong.serve(1.0);
        pong
    }

    fn serve(&mut self, toward: f32) {
        self.ball = (WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0);
        let vertical = rand::thread_rng().gen_range(-0.6..0.6);
        self.velocity = (SERVE_SPEED * toward, SERVE_SPEED * vertical);
    }

    fn handle(&mut self, event: &InputEvent) {
        if let InputEvent::Pointer { row, kind, .. } = *event {
            if matches!(kind, PointerKind::Down | PointerKind::Drag) && !self.paused {
                self.player_y = clamp_paddle(row as f32 - PADDLE_HEIGHT / 2.0);
            }
            return;
        }
        match event.action() {
            Some(Action::Pause) if !self.finished => self.paused = !self.paused,
            Some(Action::Up) if !self.paused => {
                self.player_y = clamp_paddle(self.player_y - 1.0);
            }
            Some(Action::Down) if !self.paused => {
                self.player_y = clamp_paddle(self.player_y + 1.0);
            }
            _ => {}
        }
    }

    fn speed_up(&mut self) {
        if self.paused || self.finished {
            return;
        }
        let (vx, vy) = self.velocity;
        if vx.abs() < MAX_SPEED {
            self.velocity = (vx * 1.05, vy * 1.05);
        }
    }

    fn advance(&mut self, elapsed: Duration, services: &mut Services) -> anyhow::Result<()> {
        if !self.paused && !self.finished {
            // sub-steps keep a fast ball from tunnelling through a paddle
            let mut remaining = elapsed.as_secs_f32().min(0.25);
            while remaining > 0.0 && !self.finished {
                let dt = remaining.min(1.0 / 120.0);
                remaining -= dt;
                self.physics(dt, services);
            }
        }
        self.draw(services.surface_mut());
        Ok(())
    }

    fn physics(&mut self, dt: f32, services: &mut Services) {
        let target = self.ball.1 - PADDLE_HEIGHT / 2.0;
        let reach = CPU_SPEED * dt;
        self.cpu_y = clamp_paddle(self.cpu_y + (target - self.cpu_y).clamp(-reach, reach));

        let (mut x, mut y) = self.ball;
        let (mut vx, mut vy) = self.velocity;
        x += vx * dt;
        y += vy * dt;

        if y < 0.0 {
            y = -y;
            vy = vy.abs();
        } else if y > HEIGHT as f32 - 1.0 {
            y = 2.0 * (HEIGHT as f32 - 1.0) - y;
            vy = -vy.abs();
        }

        if vx < 0.0 && x <= PLAYER_X + 1.0 && x >= PLAYER_X && hits(self.player_y, y) {
            vx = vx.abs();
            vy += deflection(self.player_y, y);
            services.play_sound("bounce");
        } else if vx > 0.0 && x >= CPU_X - 1.0 && x <= CPU_X && hits(self.cpu_y, y) {
            vx = -vx.abs();
            vy += deflection(self.cpu_y, y);
            services.play_sound("bounce");
        }

        self.ball = (x, y);
        self.velocity = (vx, vy);

        if x < 0.0 {
            self.cpu_points += 1;
            services.play_sound("miss");
            self.after_point(-1.0, services);
        } else if x >= WIDTH as f32 {
            self.player_points += 1;
            services.report_score(ScoreReport::Absolute(self.player_points as i64));
            services.play_sound("point");
            self.after_point(1.0, services);
        }
    }

    fn after_point(&mut self, toward: f32, services: &mut Services) {
        if self.player_points >= WINNING_POINTS || self.cpu_points >= WINNING_POINTS {
            self.finished = true;
            services.report_game_over();
        } else {
            self.serve(toward);
        }
    }

    fn draw(&self, surface: &mut RenderSurface) {
        let bg = Style::default().bg(BACKGROUND);
        surface.fill(bg);

        let net = bg.fg(Color::Rgb(50, 50, 80));
        for y in (0..HEIGHT as i32).step_by(2) {
            surface.put(WIDTH as i32 / 2, y, '┊', net);
        }
        let tally = format!("{}   {}", self.player_points, self.cpu_points);
        let tally_style = bg.fg(Color::Rgb(200, 200, 255)).add_modifier(Modifier::BOLD);
        surface.text_centered(0, &tally, tally_style);

        let paddle = bg.fg(Color::Rgb(180, 200, 255)).add_modifier(Modifier::BOLD);
        for (x, top) in [(PLAYER_X, self.player_y), (CPU_X, self.cpu_y)] {
            let top = top.round() as i32;
            for dy in 0..PADDLE_HEIGHT as i32 {
                surface.put(x as i32, top + dy, '█', paddle);
            }
        }
        surface.put(
            self.ball.0 as i32,
            self.ball.1.round() as i32,
            '●',
            bg.fg(Color::White).add_modifier(Modifier::BOLD),
        );

        if self.paused {
            surface.text_centered(
                HEIGHT as i32 / 2,
                " PAUSED - P to resume ",
                Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 0)),
            );
        }
    }
}

fn clamp_paddle(top: f32) -> f32 {
    top.clamp(0.0, HEIGHT as f32 - PADDLE_HEIGHT)
}

fn hits(paddle_top: f32, ball_y: f32) -> bool {
    ball_y >= paddle_top - 0.5 && ball_y <= paddle_top + PADDLE_HEIGHT - 0.5
}

/// Steeper returns off the paddle ends.
fn deflection(paddle_top: f32, ball_y: f32) -> f32 {
    let offset = (ball_y - (paddle_top + PADDLE_HEIGHT / 2.0)) / (PADDLE_HEIGHT / 2.0);
    offset * 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cabinet::services::Request;
    use crate::cabinet::AudioService;
    use crossterm::event::KeyCode;

    fn services() -> Services {
        let mut services = Services::new(AudioService::silent());
        services.surface_mut().resize(MODULE.resolution);
        services
    }

    #[test]
    fn paddle_stays_on_the_table() {
        let mut pong = Pong::new();
        for _ in 0..50 {
            pong.handle(&InputEvent::key_down(KeyCode::Up));
        }
        assert_eq!(pong.player_y, 0.0);
        pong.handle(&InputEvent::Pointer {
            column: 2,
            row: HEIGHT - 1,
            kind: PointerKind::Drag,
        });
        assert_eq!(pong.player_y, HEIGHT as f32 - PADDLE_HEIGHT);
    }

    #[test]
    fn ball_past_the_cpu_scores_for_the_player() {
        let mut services = services();
        let mut pong = Pong::new();
        pong.cpu_y = 0.0;
        pong.ball = (WIDTH as f32 - 1.5, HEIGHT as f32 - 2.0);
        pong.velocity = (SERVE_SPEED, 0.0);

        pong.physics(0.1, &mut services);
        assert_eq!(pong.player_points, 1);
        assert_eq!(services.score(), 1);
        assert_eq!(pong.ball, (WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0));
    }

    #[test]
    fn seventh_point_ends_the_match() {
        let mut services = services();
        let mut pong = Pong::new();
        pong.cpu_points = WINNING_POINTS - 1;
        pong.player_y = 0.0;
        pong.ball = (0.5, HEIGHT as f32 - 2.0);
        pong.velocity = (-SERVE_SPEED, 0.0);

        pong.physics(0.1, &mut services);
        assert!(pong.finished);
        assert_eq!(services.take_requests(), vec![Request::GameOver]);
    }

    #[test]
    fn paddle_returns_the_ball() {
        let mut services = services();
        let mut pong = Pong::new();
        pong.player_y = 8.0;
        pong.ball = (PLAYER_X + 1.1, 10.0);
        pong.velocity = (-SERVE_SPEED, 0.0);

        pong.physics(1.0 / 120.0, &mut services);
        assert!(pong.velocity.0 > 0.0);
    }
}
