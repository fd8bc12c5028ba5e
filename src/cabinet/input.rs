use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, trace};
use ratatui::layout::Rect;

use super::cancel::CancelToken;
use super::services::Services;

pub type InputHandler = Box<dyn FnMut(&InputEvent, &mut Services)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
    Drag,
    Moved,
}

/// Semantic actions shared by most games.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Primary,
    Pause,
}

/// A raw input event. Pointer coordinates are relative to the render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
        state: KeyState,
    },
    Pointer {
        column: u16,
        row: u16,
        kind: PointerKind,
    },
}

impl InputEvent {
    pub fn key_down(code: KeyCode) -> Self {
        InputEvent::Key {
            code,
            modifiers: KeyModifiers::NONE,
            state: KeyState::Down,
        }
    }

    pub fn key_up(code: KeyCode) -> Self {
        InputEvent::Key {
            code,
            modifiers: KeyModifiers::NONE,
            state: KeyState::Up,
        }
    }

    pub fn is_key_down(&self) -> bool {
        matches!(self, InputEvent::Key { state: KeyState::Down, .. })
    }

    /// The semantic action for a key press, if the key maps to one.
    pub fn action(&self) -> Option<Action> {
        let InputEvent::Key {
            code,
            state: KeyState::Down,
            ..
        } = self
        else {
            return None;
        };
        match code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Down),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Right),
            KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Primary),
            KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::Pause),
            _ => None,
        }
    }

    /// Translates a terminal mouse event into surface coordinates.
    /// Events outside `surface_area` have no surface position and are dropped.
    pub fn from_mouse(mouse: MouseEvent, surface_area: Rect) -> Option<Self> {
        let kind = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerKind::Down,
            MouseEventKind::Up(MouseButton::Left) => PointerKind::Up,
            MouseEventKind::Drag(MouseButton::Left) => PointerKind::Drag,
            MouseEventKind::Moved => PointerKind::Moved,
            _ => return None,
        };
        let inside = mouse.column >= surface_area.x
            && mouse.column < surface_area.x + surface_area.width
            && mouse.row >= surface_area.y
            && mouse.row < surface_area.y + surface_area.height;
        if !inside {
            return None;
        }
        Some(InputEvent::Pointer {
            column: mouse.column - surface_area.x,
            row: mouse.row - surface_area.y,
            kind,
        })
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(key: KeyEvent) -> Self {
        let state = match key.kind {
            KeyEventKind::Release => KeyState::Up,
            KeyEventKind::Press | KeyEventKind::Repeat => KeyState::Down,
        };
        InputEvent::Key {
            code: key.code,
            modifiers: key.modifiers,
            state,
        }
    }
}

/// Identifies the installed input handler.
#[derive(Clone, Debug)]
pub struct InputBinding {
    id: u64,
    token: CancelToken,
}

impl InputBinding {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Detaches the handler; later events are dropped.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct Bound {
    binding: InputBinding,
    handler: InputHandler,
}

/// Forwards events to the one bound handler, or drops them.
#[derive(Default)]
pub struct InputRouter {
    bound: Option<Bound>,
    next_id: u64,
    dropped: u64,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler`, removing whatever was bound before.
    pub fn bind<F>(&mut self, handler: F) -> InputBinding
    where
        F: FnMut(&InputEvent, &mut Services) + 'static,
    {
        self.unbind();
        self.next_id += 1;
        let binding = InputBinding {
            id: self.next_id,
            token: CancelToken::new(),
        };
        debug!("input binding {} installed", binding.id);
        self.bound = Some(Bound {
            binding: binding.clone(),
            handler: Box::new(handler),
        });
        binding
    }

    pub fn unbind(&mut self) -> bool {
        match self.bound.take() {
            Some(bound) => {
                bound.binding.cancel();
                debug!("input binding {} removed", bound.binding.id);
                true
            }
            None => false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound
            .as_ref()
            .is_some_and(|bound| !bound.binding.is_cancelled())
    }

    /// Events dropped because nothing was bound.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Hands `event` to the bound handler. Returns false when it was dropped.
    pub fn dispatch(&mut self, event: &InputEvent, services: &mut Services) -> bool {
        if !self.is_bound() {
            self.bound = None;
            self.dropped += 1;
            trace!("input dropped: {:?}", event);
            return false;
        }
        match self.bound.as_mut() {
            Some(bound) => {
                (bound.handler)(event, services);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cabinet::audio::AudioService;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn services() -> Services {
        Services::new(AudioService::silent())
    }

    #[test]
    fn binding_replaces_the_previous_handler() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut router = InputRouter::new();
        let mut services = services();

        let first_hits = Rc::clone(&hits);
        let first = router.bind(move |_, _| first_hits.borrow_mut().push("first"));
        let second_hits = Rc::clone(&hits);
        router.bind(move |_, _| second_hits.borrow_mut().push("second"));

        assert!(first.is_cancelled());
        assert!(router.dispatch(&InputEvent::key_down(KeyCode::Left), &mut services));
        assert_eq!(*hits.borrow(), vec!["second"]);
    }

    #[test]
    fn events_without_a_handler_are_dropped() {
        let mut router = InputRouter::new();
        let mut services = services();
        assert!(!router.dispatch(&InputEvent::key_down(KeyCode::Up), &mut services));
        let binding = router.bind(|_, services| services.add_score(1));
        binding.cancel();
        assert!(!router.dispatch(&InputEvent::key_down(KeyCode::Up), &mut services));
        assert_eq!(router.dropped(), 2);
        assert_eq!(services.score(), 0);
        assert!(!router.is_bound());
    }

    #[test]
    fn unbind_is_harmless_when_nothing_is_bound() {
        let mut router = InputRouter::new();
        assert!(!router.unbind());
        router.bind(|_, _| {});
        assert!(router.unbind());
        assert!(!router.unbind());
    }

    #[test]
    fn keys_map_to_actions_only_when_pressed() {
        assert_eq!(InputEvent::key_down(KeyCode::Char('w')).action(), Some(Action::Up));
        assert_eq!(InputEvent::key_down(KeyCode::Right).action(), Some(Action::Right));
        assert_eq!(InputEvent::key_down(KeyCode::Enter).action(), Some(Action::Primary));
        assert_eq!(InputEvent::key_down(KeyCode::Char('P')).action(), Some(Action::Pause));
        assert_eq!(InputEvent::key_down(KeyCode::Char('z')).action(), None);
        assert_eq!(InputEvent::key_up(KeyCode::Up).action(), None);
    }

    #[test]
    fn crossterm_release_becomes_key_up() {
        let mut key = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(InputEvent::from(key), InputEvent::key_up(KeyCode::Left));
    }

    #[test]
    fn mouse_is_translated_into_surface_space() {
        let area = Rect::new(10, 5, 20, 10);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            InputEvent::from_mouse(click, area),
            Some(InputEvent::Pointer {
                column: 2,
                row: 2,
                kind: PointerKind::Down
            })
        );
        let outside = MouseEvent { column: 3, ..click };
        assert_eq!(InputEvent::from_mouse(outside, area), None);
    }
}
