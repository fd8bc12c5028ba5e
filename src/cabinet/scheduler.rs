use std::time::{Duration, Instant};

use log::{debug, trace};

use super::cancel::CancelToken;
use super::error::SchedulerError;
use super::services::Services;

pub type StepFn = Box<dyn FnMut(Duration, &mut Services) -> anyhow::Result<()>>;

/// Identifies the currently scheduled frame loop.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    id: u64,
    token: CancelToken,
}

impl LoopHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stops the loop before its next frame.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct ActiveLoop {
    handle: LoopHandle,
    step: StepFn,
    last_tick: Instant,
    frames: u64,
}

/// Single-slot frame loop driver.
///
/// The slot holds at most one step function. Stopping empties the slot; the
/// step is never asked whether it wants to keep running.
#[derive(Default)]
pub struct LoopScheduler {
    active: Option<ActiveLoop>,
    next_id: u64,
}

impl LoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<F>(&mut self, now: Instant, step: F) -> Result<LoopHandle, SchedulerError>
    where
        F: FnMut(Duration, &mut Services) -> anyhow::Result<()> + 'static,
    {
        self.reap();
        if let Some(active) = &self.active {
            return Err(SchedulerError::AlreadyRunning(active.handle.id));
        }
        self.next_id += 1;
        let handle = LoopHandle {
            id: self.next_id,
            token: CancelToken::new(),
        };
        debug!("frame loop {} started", handle.id);
        self.active = Some(ActiveLoop {
            handle: handle.clone(),
            step: Box::new(step),
            last_tick: now,
            frames: 0,
        });
        Ok(handle)
    }

    /// Empties the slot. Calling it with nothing scheduled is a no-op.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.handle.cancel();
                debug!(
                    "frame loop {} stopped after {} frames",
                    active.handle.id, active.frames
                );
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_cancelled())
    }

    pub fn current(&self) -> Option<u64> {
        self.active
            .as_ref()
            .filter(|active| !active.handle.is_cancelled())
            .map(|active| active.handle.id)
    }

    /// Runs one frame of the scheduled loop, if any.
    ///
    /// The step is taken out of the slot while it runs and only put back when
    /// it succeeded and nobody asked the loop to halt during the step.
    pub fn tick(&mut self, now: Instant, services: &mut Services) -> anyhow::Result<()> {
        self.reap();
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(active.last_tick);
        active.last_tick = now;
        active.frames += 1;
        trace!("frame {} of loop {} ({:?})", active.frames, active.handle.id, elapsed);

        let result = (active.step)(elapsed, services);
        let halted = services.take_halt();
        if result.is_err() || halted || active.handle.is_cancelled() {
            active.handle.cancel();
            debug!(
                "frame loop {} ended after {} frames",
                active.handle.id, active.frames
            );
        } else {
            self.active = Some(active);
        }
        result
    }

    fn reap(&mut self) {
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.handle.is_cancelled())
        {
            if let Some(active) = self.active.take() {
                debug!("frame loop {} was cancelled", active.handle.id);
            }
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
    fn second_start_is_rejected() {
        let now = Instant::now();
        let mut scheduler = LoopScheduler::new();
        let first = scheduler.start(now, |_, _| Ok(())).unwrap();
        let err = scheduler.start(now, |_, _| Ok(())).unwrap_err();
        assert_eq!(err, SchedulerError::AlreadyRunning(first.id()));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut scheduler = LoopScheduler::new();
        assert!(!scheduler.stop());
        scheduler.start(Instant::now(), |_, _| Ok(())).unwrap();
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_active());
    }

    #[test]
    fn step_receives_elapsed_time_between_ticks() {
        let start = Instant::now();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut scheduler = LoopScheduler::new();
        let mut services = services();
        scheduler
            .start(start, move |elapsed, _| {
                log.borrow_mut().push(elapsed);
                Ok(())
            })
            .unwrap();

        scheduler.tick(start + Duration::from_millis(16), &mut services).unwrap();
        scheduler.tick(start + Duration::from_millis(50), &mut services).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![Duration::from_millis(16), Duration::from_millis(34)]
        );
    }

    #[test]
    fn halting_inside_a_step_prevents_the_next_frame() {
        let start = Instant::now();
        let frames = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&frames);
        let mut scheduler = LoopScheduler::new();
        let mut services = services();
        scheduler
            .start(start, move |_, services| {
                *counter.borrow_mut() += 1;
                services.report_game_over();
                Ok(())
            })
            .unwrap();

        scheduler.tick(start, &mut services).unwrap();
        assert!(!scheduler.is_active());
        scheduler.tick(start, &mut services).unwrap();
        assert_eq!(*frames.borrow(), 1);
    }

    #[test]
    fn failing_step_clears_the_slot() {
        let mut scheduler = LoopScheduler::new();
        let mut services = services();
        let now = Instant::now();
        scheduler.start(now, |_, _| anyhow::bail!("boom")).unwrap();
        assert!(scheduler.tick(now, &mut services).is_err());
        assert!(!scheduler.is_active());
        assert!(scheduler.start(now, |_, _| Ok(())).is_ok());
    }

    #[test]
    fn cancelled_handle_frees_the_slot() {
        let mut scheduler = LoopScheduler::new();
        let now = Instant::now();
        let handle = scheduler.start(now, |_, _| Ok(())).unwrap();
        handle.cancel();
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.current(), None);
        let next = scheduler.start(now, |_, _| Ok(())).unwrap();
        assert_ne!(next.id(), handle.id());
    }
}
