use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use log::info;
use ratatui::layout::Rect;

use rustcade_cabinet::cabinet::{Controller, InputEvent, Phase};
use rustcade_cabinet::games::GameModule;

pub struct App {
    pub should_quit: bool,
    pub selected_game: usize,
    pub controller: Controller,
    pub show_diagnostics: bool,
    /// Where the render surface was last drawn, for pointer translation.
    pub surface_area: Rect,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        Self {
            should_quit: false,
            selected_game: 0,
            controller,
            show_diagnostics: false,
            surface_area: Rect::default(),
        }
    }

    pub fn games(&self) -> Vec<GameModule> {
        self.controller.registry().modules().copied().collect()
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.controller.tick(now);
    }

    pub fn launch(&mut self, game_id: &str) {
        // failures are logged and shown on the HUD by the controller
        let _ = self.controller.launch(game_id);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let pressed = key.kind != KeyEventKind::Release;
        if pressed && key.code == KeyCode::F(2) {
            self.show_diagnostics = !self.show_diagnostics;
            return;
        }

        match self.controller.state().phase {
            Phase::Idle => {
                if pressed {
                    self.on_menu_key(key);
                }
            }
            Phase::GameOver if pressed => match key.code {
                KeyCode::Esc | KeyCode::Enter => self.controller.exit_to_menu(),
                KeyCode::Char('r') | KeyCode::Char('R') => self.replay(),
                _ => self.controller.handle_input(InputEvent::from(key)),
            },
            _ => {
                if pressed && key.code == KeyCode::Esc {
                    self.controller.exit_to_menu();
                } else {
                    self.controller.handle_input(InputEvent::from(key));
                }
            }
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.controller.state().is_idle() {
            return;
        }
        if let Some(event) = InputEvent::from_mouse(mouse, self.surface_area) {
            self.controller.handle_input(event);
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        let count = self.controller.registry().len();
        if count == 0 {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                self.should_quit = true;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Right | KeyCode::Down => {
                self.selected_game = (self.selected_game + 1) % count;
            }
            KeyCode::Left | KeyCode::Up => {
                self.selected_game = (self.selected_game + count - 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.launch_index(self.selected_game),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx < count {
                    self.selected_game = idx;
                    self.launch_index(idx);
                }
            }
            _ => {}
        }
    }

    fn launch_index(&mut self, idx: usize) {
        let id = self.controller.registry().modules().nth(idx).map(|m| m.id);
        if let Some(id) = id {
            self.launch(id);
        }
    }

    fn replay(&mut self) {
        let Some(id) = self.controller.state().active_game.clone() else {
            return;
        };
        info!("replaying {}", id);
        self.controller.exit_to_menu();
        self.launch(&id);
    }
}
