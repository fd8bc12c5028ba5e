use log::{debug, warn};

use super::error::CleanupActionError;

pub type CleanupAction = Box<dyn FnOnce() -> anyhow::Result<()>>;

struct Entry {
    label: String,
    action: CleanupAction,
}

/// Ordered teardown actions contributed by the active game.
///
/// Actions are `FnOnce`, so draining consumes them: each registration runs
/// at most once no matter how often the registry is drained.
#[derive(Default)]
pub struct CleanupRegistry {
    entries: Vec<Entry>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        let label = label.into();
        debug!("cleanup registered: {}", label);
        self.entries.push(Entry {
            label,
            action: Box::new(action),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every action in registration order and empties the registry.
    ///
    /// A failing action is logged and reported back; the remaining actions
    /// still run.
    pub fn drain(&mut self) -> Vec<CleanupActionError> {
        let mut failures = Vec::new();
        for entry in self.entries.drain(..) {
            if let Err(err) = (entry.action)() {
                let failure = CleanupActionError {
                    label: entry.label,
                    message: format!("{:#}", err),
                };
                warn!("{}", failure);
                failures.push(failure);
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn drains_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CleanupRegistry::new();
        for name in ["timer", "input", "loop"] {
            let log = Rc::clone(&log);
            registry.register(name, move || {
                log.borrow_mut().push(name);
                Ok(())
            });
        }
        assert_eq!(registry.len(), 3);
        assert!(registry.drain().is_empty());
        assert_eq!(*log.borrow(), vec!["timer", "input", "loop"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn failing_action_does_not_block_the_rest() {
        let ran = Rc::new(RefCell::new(0));
        let mut registry = CleanupRegistry::new();
        registry.register("broken", || anyhow::bail!("listener already gone"));
        let counter = Rc::clone(&ran);
        registry.register("after", move || {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        let failures = registry.drain();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].label, "broken");
        assert!(failures[0].message.contains("listener already gone"));
        assert_eq!(*ran.borrow(), 1);
    }

    #[test]
    fn second_drain_runs_nothing() {
        let ran = Rc::new(RefCell::new(0));
        let mut registry = CleanupRegistry::new();
        let counter = Rc::clone(&ran);
        registry.register("once", move || {
            *counter.borrow_mut() += 1;
            Ok(())
        });
        registry.drain();
        registry.drain();
        assert_eq!(*ran.borrow(), 1);
    }
}
