//! Infrastructure layer: persistence and concrete collaborators.

pub mod delivery;
pub mod persistence;
pub mod rendering;
