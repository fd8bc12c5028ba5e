use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::audio::AudioService;
use super::cleanup::CleanupRegistry;
use super::context::GameContext;
use super::error::CabinetError;
use super::input::{Action, InputEvent, InputRouter};
use super::scheduler::LoopScheduler;
use super::services::{Request, Services};
use super::state::{CabinetState, Phase};
use super::surface::RenderSurface;
use super::timers::{TimerHandle, Timers};
use crate::games::{GameModule, GameRegistry};

pub const DEFAULT_INSTRUCTIONS: Duration = Duration::from_secs(3);

struct InstructionsTimer {
    handle: TimerHandle,
    deadline: Instant,
}

/// Point-in-time view of the controller's resources, for logs and the
/// diagnostics panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    pub phase: Phase,
    pub active_game: Option<String>,
    pub loop_active: bool,
    pub input_bound: bool,
    pub cleanup_pending: usize,
    pub timers_pending: usize,
    pub surface_blank: bool,
    pub dropped_inputs: u64,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "phase={} game={} loop={} input={} cleanup={} timers={} surface={} dropped={}",
            self.phase,
            self.active_game.as_deref().unwrap_or("-"),
            if self.loop_active { "active" } else { "none" },
            if self.input_bound { "bound" } else { "none" },
            self.cleanup_pending,
            self.timers_pending,
            if self.surface_blank { "blank" } else { "drawn" },
            self.dropped_inputs,
        )
    }
}

/// Runs exactly one game at a time on the shared surface.
///
/// The controller owns the cabinet state and every shared service. Games only
/// reach them through the [`GameContext`] passed to `init` and the
/// [`Services`] passed to their callbacks.
pub struct Controller {
    registry: GameRegistry,
    services: Services,
    input: InputRouter,
    scheduler: LoopScheduler,
    timers: Timers,
    cleanup: CleanupRegistry,
    instructions_for: Duration,
    instructions: Option<InstructionsTimer>,
    now: Instant,
}

impl Controller {
    pub fn new(registry: GameRegistry, audio: AudioService) -> Self {
        Self {
            registry,
            services: Services::new(audio),
            input: InputRouter::new(),
            scheduler: LoopScheduler::new(),
            timers: Timers::new(),
            cleanup: CleanupRegistry::new(),
            instructions_for: DEFAULT_INSTRUCTIONS,
            instructions: None,
            now: Instant::now(),
        }
    }

    pub fn with_instructions_duration(mut self, duration: Duration) -> Self {
        self.instructions_for = duration;
        self
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn state(&self) -> &CabinetState {
        self.services.state()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn surface(&self) -> &RenderSurface {
        self.services.surface()
    }

    /// Time of the latest tick.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn active_module(&self) -> Option<&GameModule> {
        self.state()
            .active_game
            .as_deref()
            .and_then(|id| self.registry.get(id))
    }

    pub fn instructions_remaining(&self) -> Option<Duration> {
        self.instructions
            .as_ref()
            .map(|timer| timer.deadline.saturating_duration_since(self.now))
    }

    pub fn is_loop_active(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn is_input_bound(&self) -> bool {
        self.input.is_bound()
    }

    pub fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }

    pub fn launch(&mut self, game_id: &str) -> Result<(), CabinetError> {
        if let Some(active) = &self.state().active_game {
            let err = CabinetError::Busy {
                active: active.clone(),
            };
            warn!("launch {} rejected: {}", game_id, err);
            return Err(err);
        }
        let Some(module) = self.registry.get(game_id).copied() else {
            let err = CabinetError::UnknownGame(game_id.to_string());
            warn!("{}", err);
            self.services.set_notice(Some(err.to_string()));
            return Err(err);
        };

        self.services.set_notice(None);
        self.services.surface_mut().resize(module.resolution);
        let state = self.services.state_mut();
        state.active_game = Some(module.id.to_string());
        state.score = 0;
        state.title = module.title.to_string();
        state.phase = Phase::Instructions;

        let handle = self
            .timers
            .set_timeout(self.now, self.instructions_for, |services| {
                services.request(Request::BeginRunning)
            });
        let timer = handle.clone();
        self.cleanup.register("instructions timer", move || {
            timer.cancel();
            Ok(())
        });
        self.instructions = Some(InstructionsTimer {
            handle,
            deadline: self.now + self.instructions_for,
        });
        info!(
            "launched {} at {}x{}",
            module.id, module.resolution.width, module.resolution.height
        );
        Ok(())
    }

    /// Skips the rest of the instructions overlay.
    pub fn dismiss_instructions(&mut self) -> Result<(), CabinetError> {
        self.expect_phase(Phase::Instructions, "dismiss_instructions")?;
        self.enter_running();
        self.apply_requests();
        Ok(())
    }

    fn enter_running(&mut self) {
        if let Some(timer) = self.instructions.take() {
            timer.handle.cancel();
        }
        let Some(module) = self.active_module().copied() else {
            error!("no module for {:?}", self.state().active_game);
            self.exit_to_menu();
            return;
        };
        self.services.state_mut().phase = Phase::Running;
        debug!("initialising {}", module.id);

        let mut ctx = GameContext {
            services: &mut self.services,
            input: &mut self.input,
            scheduler: &mut self.scheduler,
            timers: &mut self.timers,
            cleanup: &mut self.cleanup,
            now: self.now,
        };
        if let Err(err) = (module.init)(&mut ctx) {
            self.abort("init", err);
            return;
        }
        if !self.scheduler.is_active() {
            warn!(
                "{} finished init without a frame loop: {}",
                module.id,
                self.diagnostics()
            );
        }
    }

    pub fn report_game_over(&mut self) -> Result<(), CabinetError> {
        self.expect_phase(Phase::Running, "report_game_over")?;
        self.services.state_mut().phase = Phase::GameOver;
        self.scheduler.stop();
        self.services.audio_mut().play_game_over_jingle();
        info!(
            "game over: {} scored {}",
            self.state().title,
            self.state().score
        );
        Ok(())
    }

    /// Tears down the active game and returns to the gallery. Safe to call
    /// from any phase, any number of times.
    pub fn exit_to_menu(&mut self) {
        let Some(game) = self.state().active_game.clone() else {
            debug!("exit_to_menu: already idle");
            return;
        };

        let failures = self.cleanup.drain();
        if self.scheduler.stop() {
            warn!("{} left its frame loop running", game);
        }
        self.input.unbind();
        let leaked = self.timers.clear();
        if leaked > 0 {
            warn!("{} left {} timer(s) running", game, leaked);
        }
        self.instructions = None;
        self.services.take_requests();
        self.services.take_halt();
        self.services.surface_mut().clear();
        self.services.state_mut().reset();
        info!(
            "{} exited to menu ({} cleanup failure(s))",
            game,
            failures.len()
        );
    }

    /// Routes one input event. During the instructions overlay the primary
    /// action skips ahead instead.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.state().phase == Phase::Instructions && event.action() == Some(Action::Primary) {
            let _ = self.dismiss_instructions();
            return;
        }
        self.input.dispatch(&event, &mut self.services);
        self.apply_requests();
    }

    /// Host frame: due timers first, then one step of the frame loop.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;
        self.timers.fire_due(now, &mut self.services);
        self.apply_requests();
        if let Err(err) = self.scheduler.tick(now, &mut self.services) {
            self.abort("frame step", err);
            return;
        }
        self.apply_requests();
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            phase: self.state().phase,
            active_game: self.state().active_game.clone(),
            loop_active: self.scheduler.is_active(),
            input_bound: self.input.is_bound(),
            cleanup_pending: self.cleanup.len(),
            timers_pending: self.timers.live(),
            surface_blank: self.surface().is_blank(),
            dropped_inputs: self.input.dropped(),
        }
    }

    fn apply_requests(&mut self) {
        if self.services.take_halt() {
            self.scheduler.stop();
        }
        loop {
            let requests = self.services.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                match request {
                    Request::BeginRunning => {
                        if self.state().phase == Phase::Instructions {
                            self.enter_running();
                        }
                    }
                    Request::GameOver => {
                        // rejection is already logged
                        let _ = self.report_game_over();
                    }
                }
            }
            if self.services.take_halt() {
                self.scheduler.stop();
            }
        }
    }

    fn abort(&mut self, stage: &str, err: anyhow::Error) {
        let title = self.state().title.clone();
        error!("{} failed during {}: {:#}", title, stage, err);
        self.exit_to_menu();
        self.services
            .set_notice(Some(format!("{} stopped: {}", title, err)));
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), CabinetError> {
        let phase = self.state().phase;
        if phase == expected {
            return Ok(());
        }
        let err = CabinetError::IllegalState { operation, phase };
        warn!("{}", err);
        Err(err)
    }
}
