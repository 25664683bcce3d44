use serde_json::Value;

use crate::api::host::RenderHost;
use crate::api::types::NodeIds;
use crate::assets::atlas::AtlasView;
use crate::assets::definitions::BeamDefinitions;
use crate::core::rng::RandomSource;
use crate::systems::operations::OperationTable;

/// Everything a beam needs from its subsystem while it is being changed.
/// Built per call by `BeamSystem`; borrows disjoint parts of it.
pub struct BeamContext<'a> {
    /// `None` when no scene is active.
    pub host: Option<&'a mut dyn RenderHost>,
    pub definitions: &'a BeamDefinitions,
    pub operations: &'a OperationTable,
    pub atlas: AtlasView,
    pub rng: &'a mut dyn RandomSource,
    pub ids: &'a mut NodeIds,
    /// Function calls addressed to other beams, run after the current pass.
    pub deferred: &'a mut Vec<DeferredCall>,
}

/// A function action whose receiver is another pooled beam.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredCall {
    pub receiver: String,
    pub name: String,
    pub args: Vec<Value>,
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use crate::assets::atlas::AtlasSize;
    use crate::core::rng::Rng;
    use crate::core::scene::SceneGraph;

    /// Owns everything a `BeamContext` borrows, for unit tests.
    pub struct Fixture {
        pub host: SceneGraph,
        pub definitions: BeamDefinitions,
        pub operations: OperationTable,
        pub atlas: AtlasView,
        pub rng: Rng,
        pub ids: NodeIds,
        pub deferred: Vec<DeferredCall>,
    }

    impl Fixture {
        pub fn new(definitions: BeamDefinitions) -> Self {
            Self {
                host: SceneGraph::new(),
                definitions,
                operations: OperationTable::with_builtins(),
                atlas: AtlasView {
                    filename: "Beams".into(),
                    size: Some(AtlasSize { width: 32, height: 16 }),
                    rows: 2,
                },
                rng: Rng::new(42),
                ids: NodeIds::new(),
                deferred: Vec::new(),
            }
        }

        pub fn ctx(&mut self) -> BeamContext<'_> {
            BeamContext {
                host: Some(&mut self.host as &mut dyn RenderHost),
                definitions: &self.definitions,
                operations: &self.operations,
                atlas: self.atlas.clone(),
                rng: &mut self.rng,
                ids: &mut self.ids,
                deferred: &mut self.deferred,
            }
        }
    }
}
