pub mod instance;

pub use instance::{SegmentBuffer, SegmentInstance};
