use log::debug;

use super::audio::AudioService;
use super::state::{CabinetState, Phase};
use super::surface::RenderSurface;

pub const CABINET_NAME: &str = "RustCade";

/// How a game reports its score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreReport {
    Delta(i64),
    Absolute(i64),
}

/// Work a callback asks the controller to do once it has returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Request {
    BeginRunning,
    GameOver,
}

/// Shared services handed to every frame step, input handler and timer.
///
/// Callbacks receive `&mut Services` for the duration of one call only, so no
/// game can keep hold of the surface or the state after it exits.
pub struct Services {
    state: CabinetState,
    surface: RenderSurface,
    audio: AudioService,
    notice: Option<String>,
    requests: Vec<Request>,
    halt_loop: bool,
}

impl Services {
    pub fn new(audio: AudioService) -> Self {
        Self {
            state: CabinetState::default(),
            surface: RenderSurface::new(),
            audio,
            notice: None,
            requests: Vec::new(),
            halt_loop: false,
        }
    }

    pub fn state(&self) -> &CabinetState {
        &self.state
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RenderSurface {
        &mut self.surface
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn set_score(&mut self, score: i64) {
        if self.state.phase == Phase::GameOver {
            debug!("score frozen after game over, ignoring {}", score);
            return;
        }
        self.state.score = score.clamp(0, u32::MAX as i64) as u32;
    }

    pub fn add_score(&mut self, delta: i64) {
        self.set_score(i64::from(self.state.score).saturating_add(delta));
    }

    pub fn report_score(&mut self, report: ScoreReport) {
        match report {
            ScoreReport::Delta(delta) => self.add_score(delta),
            ScoreReport::Absolute(score) => self.set_score(score),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state.title = title.into();
    }

    pub fn play_sound(&mut self, effect_id: &str) {
        self.audio.play(effect_id);
    }

    /// Ends the current play-through once this callback returns.
    ///
    /// Also halts the frame loop, so the step that detected game over is the
    /// last one to draw.
    pub fn report_game_over(&mut self) {
        self.halt_loop = true;
        self.requests.push(Request::GameOver);
    }

    /// Stops the frame loop after the current step without ending the game.
    pub fn stop_loop(&mut self) {
        self.halt_loop = true;
    }

    /// The HUD readout: title and score, or the cabinet name when idle.
    pub fn hud_text(&self) -> String {
        if self.state.is_idle() {
            return CABINET_NAME.to_string();
        }
        format!("{}  Score: {}", self.state.title, self.state.score)
    }

    /// Transient user-facing message, e.g. a failed launch.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn audio(&self) -> &AudioService {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioService {
        &mut self.audio
    }

    pub(crate) fn state_mut(&mut self) -> &mut CabinetState {
        &mut self.state
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    pub(crate) fn request(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub(crate) fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    pub(crate) fn take_halt(&mut self) -> bool {
        std::mem::replace(&mut self.halt_loop, false)
    }
}
