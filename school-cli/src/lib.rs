//! Headless driver for the fish school simulation.
//!
//! Owns everything the simulation core leaves to its caller: when to step,
//! where settings come from and how state is handed on.

pub mod command;
pub mod playback;
pub mod settings;
pub mod simulation;

pub use command::{run_interactive, Command};
pub use playback::Playback;
pub use settings::{build_school, load_settings, school_config};
pub use simulation::{snapshot, Simulation};
