pub mod action;
pub mod beams;
pub mod context;
pub mod operations;

pub use beams::{BeamHandle, BeamSystem};
