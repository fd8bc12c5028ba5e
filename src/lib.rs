//! RustCade cabinet: a terminal arcade that hosts a gallery of minigames and
//! runs exactly one of them at a time on a shared render surface.
//!
//! - [`cabinet`] holds the controller and the shared services games rely on.
//! - [`games`] holds the game module contract, the registry and the bundled games.
//! - [`config`] and [`logging`] are the binary's ambient setup.

pub mod cabinet;
pub mod config;
pub mod games;
pub mod logging;
