use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::api::types::SegmentId;
use crate::assets::atlas::{AtlasView, FrameRect};
use crate::core::geometry::{distance_to, length_dir, rotation_to, SegmentLine};
use crate::error::BeamError;

/// Derived draw transform for one segment: a tiling strip `length` pixels
/// long and one atlas row tall, rotated about its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSprite {
    /// Top-left corner, already shifted so the strip is centred on the line.
    pub position: Vec2,
    pub length: f32,
    pub height: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Source rectangle in the beam atlas.
    pub frame: FrameRect,
}

/// One straight piece of a beam. Owned by its beam.
#[derive(Debug, Clone)]
pub struct BeamSegment {
    id: SegmentId,
    image_row: u32,
    pub origin: Vec2,
    pub target: Vec2,
    sprite: Option<SegmentSprite>,
}

impl BeamSegment {
    pub fn new(id: SegmentId, image_row: u32, line: SegmentLine) -> Self {
        Self {
            id,
            image_row,
            origin: line.origin,
            target: line.target,
            sprite: None,
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn image_row(&self) -> u32 {
        self.image_row
    }

    pub fn set_line(&mut self, line: SegmentLine) {
        self.origin = line.origin;
        self.target = line.target;
    }

    /// The current draw transform, or `None` when the atlas is unusable.
    pub fn sprite(&self) -> Option<&SegmentSprite> {
        self.sprite.as_ref()
    }

    /// Recompute the draw transform from origin/target.
    /// On atlas errors rendering is suppressed for this segment.
    pub fn refresh(&mut self, atlas: &AtlasView) -> Result<(), BeamError> {
        let layout = match atlas.layout() {
            Ok(layout) => layout,
            Err(err) => {
                self.sprite = None;
                return Err(err);
            }
        };
        let height = layout.row_height as f32;
        let rotation = rotation_to(self.origin, self.target);
        let shift = length_dir(Vec2::ZERO, height * 0.5, rotation - FRAC_PI_2);
        self.sprite = Some(SegmentSprite {
            position: self.origin + shift,
            length: distance_to(self.origin, self.target),
            height,
            rotation,
            frame: layout.frame(self.image_row),
        });
        Ok(())
    }
}
