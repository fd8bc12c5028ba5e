use std::fmt;

/// Where the cabinet is in a game's lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Instructions,
    Running,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Instructions => "showing instructions",
            Phase::Running => "running",
            Phase::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// The controller's single mutable record.
///
/// `active_game` is `None` exactly when `phase` is [`Phase::Idle`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CabinetState {
    pub active_game: Option<String>,
    pub phase: Phase,
    pub score: u32,
    pub title: String,
}

impl CabinetState {
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub(crate) fn reset(&mut self) {
        *self = CabinetState::default();
    }
}
