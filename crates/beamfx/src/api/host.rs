// api/host.rs
//
// Contracts the embedding engine fulfils for the beam subsystem.
// The core never assumes a tree shape beyond "beams are children of the
// effect layer, segments are children of their beam".

use crate::api::types::NodeId;
use crate::assets::atlas::AtlasSize;

/// The scene the beams are drawn into.
pub trait RenderHost {
    /// Add `node` to the display tree. `parent` is `None` for the effect layer.
    fn attach(&mut self, node: NodeId, parent: Option<NodeId>);

    /// Remove `node` (and anything attached under it) from the display tree.
    fn detach(&mut self, node: NodeId);
}

/// Reports the pixel size of loaded images.
pub trait AtlasProvider {
    /// Size of the image stored under `filename`, or `None` while it is not loaded.
    fn get(&self, filename: &str) -> Option<AtlasSize>;
}
