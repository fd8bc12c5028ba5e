use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag for loops, input bindings and timers.
///
/// Clones observe the same flag. The slot that owns the callback (scheduler,
/// router, timer queue) checks the flag before every invocation and drops the
/// callback once it is set.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
        // cancelling twice is harmless
        observer.cancel();
        assert!(token.is_cancelled());
    }
}
