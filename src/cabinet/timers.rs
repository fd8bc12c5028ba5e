use std::time::{Duration, Instant};

use log::trace;

use super::cancel::CancelToken;
use super::services::Services;

pub type TimerCallback = Box<dyn FnMut(&mut Services)>;

#[derive(Clone, Debug)]
pub struct TimerHandle {
    id: u64,
    token: CancelToken,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct Timer {
    handle: TimerHandle,
    due: Instant,
    period: Option<Duration>,
    callback: TimerCallback,
}

/// Timeouts and intervals, fired from the host frame tick.
#[derive(Default)]
pub struct Timers {
    pending: Vec<Timer>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timeout<F>(&mut self, now: Instant, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce(&mut Services) + 'static,
    {
        let mut callback = Some(callback);
        self.schedule(now + delay, None, move |services| {
            if let Some(callback) = callback.take() {
                callback(services);
            }
        })
    }

    pub fn set_interval<F>(&mut self, now: Instant, period: Duration, callback: F) -> TimerHandle
    where
        F: FnMut(&mut Services) + 'static,
    {
        self.schedule(now + period, Some(period), callback)
    }

    fn schedule<F>(&mut self, due: Instant, period: Option<Duration>, callback: F) -> TimerHandle
    where
        F: FnMut(&mut Services) + 'static,
    {
        self.next_id += 1;
        let handle = TimerHandle {
            id: self.next_id,
            token: CancelToken::new(),
        };
        self.pending.push(Timer {
            handle: handle.clone(),
            due,
            period,
            callback: Box::new(callback),
        });
        handle
    }

    /// Number of timers that have neither fired for good nor been cancelled.
    pub fn live(&self) -> usize {
        self.pending
            .iter()
            .filter(|timer| !timer.handle.is_cancelled())
            .count()
    }

    /// Fires every timer due at `now`, earliest first. Intervals re-arm one
    /// period later; a slow frame does not cause a burst of catch-up calls.
    pub fn fire_due(&mut self, now: Instant, services: &mut Services) {
        self.pending.retain(|timer| !timer.handle.is_cancelled());
        let (mut due, rest): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|timer| timer.due <= now);
        self.pending = rest;
        due.sort_by_key(|timer| timer.due);

        for mut timer in due {
            if timer.handle.is_cancelled() {
                continue;
            }
            trace!("timer {} fired", timer.handle.id);
            (timer.callback)(services);
            if let Some(period) = timer.period {
                if !timer.handle.is_cancelled() {
                    timer.due = (timer.due + period).max(now + period);
                    self.pending.push(timer);
                }
            }
        }
    }

    /// Drops every pending timer and returns how many were still live.
    pub fn clear(&mut self) -> usize {
        let live = self.live();
        for timer in self.pending.drain(..) {
            timer.handle.cancel();
        }
        live
    }
}
