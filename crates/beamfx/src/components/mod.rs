pub mod beam;
pub mod segment;
