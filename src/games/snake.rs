use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;
use ratatui::style::{Color, Modifier, Style};

use super::GameModule;
use crate::cabinet::{Action, GameContext, RenderSurface, Resolution, ScoreReport, Services};

const WIDTH: u16 = 40;
const HEIGHT: u16 = 20;
const START_STEP: Duration = Duration::from_millis(140);
const MIN_STEP: Duration = Duration::from_millis(60);
const SPEED_UP: Duration = Duration::from_millis(4);
const FOOD_POINTS: i64 = 10;

const BACKGROUND: Color = Color::Rgb(10, 20, 10);

pub const MODULE: GameModule = GameModule {
    id: "snake",
    title: "Snake",
    resolution: Resolution::new(WIDTH, HEIGHT),
    controls: &[("↑ ↓ ← → / WASD", "Steer"), ("P", "Pause"), ("Esc", "Menu")],
    instructions: "Eat the food to grow longer. Every bite makes you faster. \
                   Don't run into the walls or your own tail.",
    init,
};

fn init(ctx: &mut GameContext<'_>) -> anyhow::Result<()> {
    let game = Rc::new(RefCell::new(Snake::new()));
    game.borrow().draw(ctx.surface());

    let steering = Rc::clone(&game);
    let binding = ctx.bind_input(move |event, _| {
        if let Some(action) = event.action() {
            steering.borrow_mut().steer(action);
        }
    });
    ctx.register_cleanup("snake input", move || {
        binding.cancel();
        Ok(())
    });

    let stepping = Rc::clone(&game);
    let frame_loop =
        ctx.start_loop(move |elapsed, services| stepping.borrow_mut().advance(elapsed, services))?;
    ctx.register_cleanup("snake loop", move || {
        frame_loop.cancel();
        Ok(())
    });
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
        }
    }

    fn opposite(self) -> Self {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}

struct Snake {
    /// Head first.
    body: VecDeque<(i32, i32)>,
    heading: Heading,
    queued: Option<Heading>,
    food: (i32, i32),
    step_every: Duration,
    since_step: Duration,
    paused: bool,
    alive: bool,
}

impl Snake {
    fn new() -> Self {
        let (cx, cy) = (WIDTH as i32 / 2, HEIGHT as i32 / 2);
        let mut snake = Self {
            body: VecDeque::from(vec![(cx, cy), (cx - 1, cy), (cx - 2, cy)]),
            heading: Heading::Right,
            queued: None,
            food: (0, 0),
            step_every: START_STEP,
            since_step: Duration::ZERO,
            paused: false,
            alive: true,
        };
        snake.place_food();
        snake
    }

    fn steer(&mut self, action: Action) {
        let heading = match action {
            Action::Up => Heading::Up,
            Action::Down => Heading::Down,
            Action::Left => Heading::Left,
            Action::Right => Heading::Right,
            Action::Pause => {
                if self.alive {
                    self.paused = !self.paused;
                }
                return;
            }
            Action::Primary => return,
        };
        // compare against the heading the next move will actually use
        let next = self.queued.unwrap_or(self.heading);
        if heading != next.opposite() {
            self.queued = Some(heading);
        }
    }

    fn advance(&mut self, elapsed: Duration, services: &mut Services) -> anyhow::Result<()> {
        if self.alive && !self.paused {
            self.since_step += elapsed;
            while self.alive && self.since_step >= self.step_every {
                self.since_step -= self.step_every;
                self.move_once(services);
            }
        }
        self.draw(services.surface_mut());
        Ok(())
    }

    fn move_once(&mut self, services: &mut Services) {
        if let Some(heading) = self.queued.take() {
            self.heading = heading;
        }
        let (dx, dy) = self.heading.delta();
        let (hx, hy) = self.body[0];
        let next = (hx + dx, hy + dy);
        let eating = next == self.food;

        // the tail moves out of the way unless we are growing
        let solid = self.body.len() - usize::from(!eating);
        let hits_self = self.body.iter().take(solid).any(|&seg| seg == next);
        if !in_bounds(next) || hits_self {
            self.alive = false;
            services.play_sound("crash");
            services.report_game_over();
            return;
        }

        self.body.push_front(next);
        if eating {
            services.report_score(ScoreReport::Delta(FOOD_POINTS));
            services.play_sound("eat");
            self.step_every = self.step_every.saturating_sub(SPEED_UP).max(MIN_STEP);
            if !self.place_food() {
                // board is full
                self.alive = false;
                services.play_sound("cleared");
                services.report_game_over();
            }
        } else {
            self.body.pop_back();
        }
    }

    fn place_food(&mut self) -> bool {
        let free: Vec<(i32, i32)> = (0..HEIGHT as i32)
            .flat_map(|y| (0..WIDTH as i32).map(move |x| (x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            return false;
        }
        self.food = free[rand::thread_rng().gen_range(0..free.len())];
        true
    }

    fn draw(&self, surface: &mut RenderSurface) {
        let bg = Style::default().bg(BACKGROUND);
        surface.fill(bg);

        surface.put(self.food.0, self.food.1, '●', bg.fg(Color::Rgb(255, 80, 80)));
        for (i, &(x, y)) in self.body.iter().enumerate() {
            let (ch, fg) = if i == 0 {
                ('@', Color::Rgb(180, 255, 120))
            } else {
                ('█', Color::Rgb(60, 200, 60))
            };
            surface.put(x, y, ch, bg.fg(fg).add_modifier(Modifier::BOLD));
        }

        if self.paused {
            surface.text_centered(
                HEIGHT as i32 / 2 - 2,
                " PAUSED - P to resume ",
                Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 0)),
            );
        }
    }
}

fn in_bounds((x, y): (i32, i32)) -> bool {
    x >= 0 && y >= 0 && x < WIDTH as i32 && y < HEIGHT as i32
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
    fn eating_grows_and_scores() {
        let mut services = services();
        let mut snake = Snake::new();
        let (hx, hy) = snake.body[0];
        snake.food = (hx + 1, hy);

        snake.advance(START_STEP, &mut services).unwrap();
        assert_eq!(snake.body.len(), 4);
        assert_eq!(services.score(), 10);
        assert!(snake.step_every < START_STEP);
        assert_ne!(snake.food, (hx + 1, hy));
    }

    #[test]
    fn reversing_is_ignored() {
        let mut snake = Snake::new();
        snake.steer(Action::Left);
        assert_eq!(snake.queued, None);
        snake.steer(Action::Up);
        // Up is queued, so Down would reverse into the neck
        snake.steer(Action::Down);
        assert_eq!(snake.queued, Some(Heading::Up));
    }

    #[test]
    fn hitting_the_wall_reports_game_over() {
        let mut services = services();
        let mut snake = Snake::new();
        snake.food = (0, 0);
        let steps_to_wall = WIDTH as u32;
        snake
            .advance(START_STEP * steps_to_wall, &mut services)
            .unwrap();
        assert!(!snake.alive);
        assert_eq!(services.take_requests(), vec![Request::GameOver]);
    }

    #[test]
    fn paused_snake_does_not_move() {
        let mut services = services();
        let mut snake = Snake::new();
        let head = snake.body[0];
        snake.steer(Action::Pause);
        snake.advance(START_STEP * 3, &mut services).unwrap();
        assert_eq!(snake.body[0], head);
        assert!(!services.surface().is_blank());
    }
}
