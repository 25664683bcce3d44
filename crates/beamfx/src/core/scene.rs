use crate::api::host::RenderHost;
use crate::api::types::NodeId;

/// Simple display tree using a flat Vec of (node, parent) pairs.
/// Designed for effect-layer counts (hundreds of nodes, not millions).
///
/// Serves as the render host for the WASM bridge and for tests.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<(NodeId, Option<NodeId>)>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(256),
        }
    }

    /// Whether `node` is currently attached.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.iter().any(|(n, _)| *n == node)
    }

    /// Parent of an attached node. `Some(None)` means the effect layer.
    pub fn parent_of(&self, node: NodeId) -> Option<Option<NodeId>> {
        self.nodes.iter().find(|(n, _)| *n == node).map(|(_, p)| *p)
    }

    /// Children of `parent` in attach order. `None` lists the effect layer.
    pub fn children(&self, parent: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, p)| *p == parent)
            .map(|(n, _)| *n)
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl RenderHost for SceneGraph {
    fn attach(&mut self, node: NodeId, parent: Option<NodeId>) {
        if !self.contains(node) {
            self.nodes.push((node, parent));
        }
    }

    fn detach(&mut self, node: NodeId) {
        let mut doomed = vec![node];
        while let Some(current) = doomed.pop() {
            doomed.extend(self.children(Some(current)));
            self.nodes.retain(|(n, _)| *n != current);
        }
    }
}
