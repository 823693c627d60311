//! Node logic without any I/O concerns

pub mod dice;
pub mod dropdown;
pub mod modulo;
pub mod shot;
pub mod text;

pub use dice::{Die, DieError};
pub use modulo::{CycleCounter, CycleOutcome, ModuloError, ModuloOutcome};
pub use shot::{BeatParseError, ShotPosition};
pub use text::LineSelectError;
