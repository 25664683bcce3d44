use bytemuck::{Pod, Zeroable};

use crate::components::segment::SegmentSprite;

/// Per-segment render data handed to the host renderer.
/// 8 floats = 32 bytes stride.
///
/// The host draws a tiling strip `length` x `height` at (x, y), rotated by
/// `rotation` about that corner, sampling the atlas frame at
/// (frame_x, frame_y, frame_width, height).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SegmentInstance {
    /// X position of the strip's top-left corner.
    pub x: f32,
    /// Y position of the strip's top-left corner.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Strip length in pixels (origin to target).
    pub length: f32,
    /// Strip height in pixels (one atlas row).
    pub height: f32,
    /// Atlas frame left edge.
    pub frame_x: f32,
    /// Atlas frame top edge (row * row height).
    pub frame_y: f32,
    /// Atlas frame width.
    pub frame_width: f32,
}

impl SegmentInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn from_sprite(sprite: &SegmentSprite) -> Self {
        Self {
            x: sprite.position.x,
            y: sprite.position.y,
            rotation: sprite.rotation,
            length: sprite.length,
            height: sprite.height,
            frame_x: sprite.frame.x as f32,
            frame_y: sprite.frame.y as f32,
            frame_width: sprite.frame.width as f32,
        }
    }
}

/// All drawable segments for one frame, in beam update order.
pub struct SegmentBuffer {
    pub instances: Vec<SegmentInstance>,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: SegmentInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Flat float view, `FLOATS` per instance.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for shared-memory reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for SegmentBuffer {
    fn default() -> Self {
        Self::new()
    }
}
