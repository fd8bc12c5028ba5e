//! The cabinet core: one active game, its frame loop, its input binding and
//! everything it must give back when it ends.

pub mod audio;
pub mod cancel;
pub mod cleanup;
pub mod context;
pub mod controller;
pub mod error;
pub mod input;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod surface;
pub mod timers;

pub use audio::{AudioService, AudioSink, Cue, GAME_OVER_JINGLE};
pub use cancel::CancelToken;
pub use cleanup::CleanupRegistry;
pub use context::GameContext;
pub use controller::{Controller, Diagnostics};
pub use error::{CabinetError, CleanupActionError, SchedulerError};
pub use input::{Action, InputBinding, InputEvent, InputRouter, KeyState, PointerKind};
pub use scheduler::{LoopHandle, LoopScheduler};
pub use services::{ScoreReport, Services};
pub use state::{CabinetState, Phase};
pub use surface::{RenderSurface, Resolution};
pub use timers::{TimerHandle, Timers};
