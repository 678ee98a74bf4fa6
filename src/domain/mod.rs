//! Domain layer: entities, repository traits, and collaborator seams.

pub mod delivery;
pub mod entities;
pub mod rendering;
pub mod repositories;
pub mod send_command;
pub mod send_worker;
