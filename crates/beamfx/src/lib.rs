pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod assets;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::command::{Anchor, BeamCommand, Endpoint, Horizontal, TargetResolver, Vertical};
pub use api::config::{BeamConfig, ImageConfig};
pub use api::host::{AtlasProvider, RenderHost};
pub use api::types::{BeamId, BeamTypeId, NodeId, SegmentId};
pub use assets::atlas::{AtlasLayout, AtlasSize, AtlasSizes, AtlasView, FrameRect};
pub use assets::definitions::{
    ActionDescriptor, ActionKind, BeamDefinitions, BeamTypeDefinition, TimelineEntry, TweenField,
};
pub use components::beam::Beam;
pub use components::segment::{BeamSegment, SegmentSprite};
pub use core::geometry::{decompose_crackle, decompose_straight, CrackleParams, SegmentLine};
pub use core::rng::{RandomSource, Rng, ScriptedRandom};
pub use core::scene::SceneGraph;
pub use error::BeamError;
pub use renderer::instance::{SegmentBuffer, SegmentInstance};
pub use systems::action::{Action, ActionState};
pub use systems::beams::{BeamHandle, BeamSystem};
pub use systems::context::BeamContext;
pub use systems::operations::{Operation, OperationTable};
