use std::time::{Duration, Instant};

use super::cleanup::CleanupRegistry;
use super::error::SchedulerError;
use super::input::{InputBinding, InputEvent, InputRouter};
use super::scheduler::{LoopHandle, LoopScheduler};
use super::services::{ScoreReport, Services};
use super::surface::RenderSurface;
use super::timers::{TimerHandle, Timers};

/// Everything a game's `init` may touch, borrowed from the controller for the
/// duration of the call.
///
/// Resources acquired here (bindings, loops, timers) should be handed to
/// [`GameContext::register_cleanup`] so they are released when the game ends.
pub struct GameContext<'a> {
    pub(crate) services: &'a mut Services,
    pub(crate) input: &'a mut InputRouter,
    pub(crate) scheduler: &'a mut LoopScheduler,
    pub(crate) timers: &'a mut Timers,
    pub(crate) cleanup: &'a mut CleanupRegistry,
    pub(crate) now: Instant,
}

impl GameContext<'_> {
    pub fn surface(&mut self) -> &mut RenderSurface {
        self.services.surface_mut()
    }

    pub fn services(&mut self) -> &mut Services {
        &mut *self.services
    }

    pub fn register_cleanup<F>(&mut self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.cleanup.register(label, action);
    }

    pub fn report_score(&mut self, report: ScoreReport) {
        self.services.report_score(report);
    }

    pub fn play_sound(&mut self, effect_id: &str) {
        self.services.play_sound(effect_id);
    }

    pub fn bind_input<F>(&mut self, handler: F) -> InputBinding
    where
        F: FnMut(&InputEvent, &mut Services) + 'static,
    {
        self.input.bind(handler)
    }

    pub fn start_loop<F>(&mut self, step: F) -> Result<LoopHandle, SchedulerError>
    where
        F: FnMut(Duration, &mut Services) -> anyhow::Result<()> + 'static,
    {
        self.scheduler.start(self.now, step)
    }

    pub fn set_timeout<F>(&mut self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce(&mut Services) + 'static,
    {
        self.timers.set_timeout(self.now, delay, callback)
    }

    pub fn set_interval<F>(&mut self, period: Duration, callback: F) -> TimerHandle
    where
        F: FnMut(&mut Services) + 'static,
    {
        self.timers.set_interval(self.now, period, callback)
    }
}
