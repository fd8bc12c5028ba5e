pub mod breakout;
pub mod pong;
pub mod snake;

use std::collections::BTreeMap;

use crate::cabinet::{CabinetError, GameContext, Resolution};

pub type InitFn = fn(&mut GameContext<'_>) -> anyhow::Result<()>;

/// Immutable descriptor of one pluggable game.
///
/// `init` receives a [`GameContext`] when the instructions overlay ends. It
/// binds input, starts its frame loop and registers cleanup for everything it
/// acquired.
#[derive(Clone, Copy)]
pub struct GameModule {
    pub id: &'static str,
    pub title: &'static str,
    pub resolution: Resolution,
    /// Key legend shown on the instructions overlay: (keys, meaning).
    pub controls: &'static [(&'static str, &'static str)],
    pub instructions: &'static str,
    pub init: InitFn,
}

impl std::fmt::Debug for GameModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameModule")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("resolution", &self.resolution)
            .finish()
    }
}

/// Games known to the cabinet, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct GameRegistry {
    modules: BTreeMap<&'static str, GameModule>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The games that ship with the cabinet.
    pub fn bundled() -> Self {
        let mut registry = Self::new();
        for module in [breakout::MODULE, pong::MODULE, snake::MODULE] {
            // ids above are distinct literals
            let _ = registry.register(module);
        }
        registry
    }

    pub fn register(&mut self, module: GameModule) -> Result<(), CabinetError> {
        if self.modules.contains_key(module.id) {
            return Err(CabinetError::DuplicateGame(module.id.to_string()));
        }
        self.modules.insert(module.id, module);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&GameModule> {
        self.modules.get(id)
    }

    pub fn modules(&self) -> impl Iterator<Item = &GameModule> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_games_are_registered() {
        let registry = GameRegistry::bundled();
        let ids: Vec<&str> = registry.modules().map(|m| m.id).collect();
        assert_eq!(ids, vec!["breakout", "pong", "snake"]);
        assert_eq!(registry.get("pong").map(|m| m.title), Some("Pong"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = GameRegistry::bundled();
        let err = registry.register(snake::MODULE).unwrap_err();
        assert_eq!(err, CabinetError::DuplicateGame("snake".into()));
        assert_eq!(registry.len(), 3);
    }
}
