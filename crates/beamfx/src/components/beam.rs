use glam::Vec2;
use log::{debug, warn};

use crate::api::host::RenderHost;
use crate::api::types::{BeamId, BeamTypeId, NodeId};
use crate::assets::atlas::AtlasView;
use crate::assets::definitions::{BeamDefinitions, BeamTypeDefinition, TweenField};
use crate::components::segment::BeamSegment;
use crate::core::geometry::{decompose_crackle, decompose_straight, CrackleParams, SegmentLine};
use crate::error::BeamError;
use crate::systems::action::{Action, ActionState};
use crate::systems::context::BeamContext;

/// A live scripted beam between two points.
///
/// The beam owns its segments and running actions. Its clock (`active_time`)
/// advances once per update; timeline entries fire when the clock equals
/// their frame, so each entry fires once per epoch between rewinds.
#[derive(Debug)]
pub struct Beam {
    id: BeamId,
    key: Option<String>,
    pub origin: Vec2,
    pub target: Vec2,
    beam_type: BeamTypeId,
    segments: Vec<BeamSegment>,
    actions: Vec<Action>,
    active_time: i32,
    attached: bool,
    retired: bool,
}

impl Beam {
    /// Build a detached beam with a single straight segment.
    /// An unknown beam type is logged and leaves the beam without segments.
    pub fn new(
        id: BeamId,
        key: Option<String>,
        beam_type: BeamTypeId,
        origin: Vec2,
        target: Vec2,
        ctx: &mut BeamContext<'_>,
    ) -> Self {
        let mut beam = Self {
            id,
            key,
            origin,
            target,
            beam_type,
            segments: Vec::new(),
            actions: Vec::new(),
            active_time: 0,
            attached: false,
            retired: false,
        };
        if let Err(err) = beam.set_beam_type(beam_type, ctx) {
            warn!("beam {}: {err}", id.0);
        }
        beam
    }

    pub fn id(&self) -> BeamId {
        self.id
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn beam_type(&self) -> BeamTypeId {
        self.beam_type
    }

    pub fn active_time(&self) -> i32 {
        self.active_time
    }

    pub fn segments(&self) -> &[BeamSegment] {
        &self.segments
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the beam has asked to be torn down.
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn definition<'d>(&self, definitions: &'d BeamDefinitions) -> Option<&'d BeamTypeDefinition> {
        definitions.get(self.beam_type)
    }

    pub fn image_row(&self, definitions: &BeamDefinitions) -> Option<u32> {
        self.definition(definitions).map(|def| def.image_row)
    }

    pub fn field(&self, field: TweenField) -> f32 {
        match field {
            TweenField::OriginX => self.origin.x,
            TweenField::OriginY => self.origin.y,
            TweenField::TargetX => self.target.x,
            TweenField::TargetY => self.target.y,
        }
    }

    pub fn set_field(&mut self, field: TweenField, value: f32) {
        match field {
            TweenField::OriginX => self.origin.x = value,
            TweenField::OriginY => self.origin.y = value,
            TweenField::TargetX => self.target.x = value,
            TweenField::TargetY => self.target.y = value,
        }
    }

    /// Switch to another beam type: restart the clock and rebuild as one
    /// straight segment. An unknown type is still recorded, so the beam stops
    /// firing timeline entries until a valid type is set.
    pub fn set_beam_type(&mut self, beam_type: BeamTypeId, ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
        self.beam_type = beam_type;
        if ctx.definitions.get(beam_type).is_none() {
            return Err(BeamError::InvalidBeamType(beam_type));
        }
        self.active_time = 0;
        self.set_segments(1, ctx)
    }

    /// Rebuild as `count` collinear segments from origin to target.
    pub fn set_segments(&mut self, count: usize, ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
        let lines = decompose_straight(self.origin, self.target, count);
        self.replace_segments(lines, ctx)
    }

    /// Rebuild as a jittered lightning path from origin to target.
    pub fn crackle(&mut self, params: &CrackleParams, ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
        let lines = decompose_crackle(self.origin, self.target, params, &mut *ctx.rng);
        self.replace_segments(lines, ctx)
    }

    fn replace_segments(&mut self, lines: Vec<SegmentLine>, ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
        let row = self
            .image_row(ctx.definitions)
            .ok_or(BeamError::InvalidBeamType(self.beam_type))?;
        self.remove_segments(ctx);

        let mut atlas_error = None;
        for line in lines {
            let mut segment = BeamSegment::new(ctx.ids.next_segment(), row, line);
            if let Err(err) = segment.refresh(&ctx.atlas) {
                atlas_error = Some(err);
            }
            if self.attached {
                if let Some(host) = ctx.host.as_mut() {
                    host.attach(NodeId::Segment(segment.id()), Some(NodeId::Beam(self.id)));
                }
            }
            self.segments.push(segment);
        }
        if let Some(err) = atlas_error {
            warn!("beam {}: {err}", self.id.0);
        }
        Ok(())
    }

    fn remove_segments(&mut self, ctx: &mut BeamContext<'_>) {
        for segment in self.segments.drain(..) {
            if self.attached {
                if let Some(host) = ctx.host.as_mut() {
                    host.detach(NodeId::Segment(segment.id()));
                }
            }
        }
    }

    /// Recompute every segment's draw transform, e.g. after the atlas loads.
    pub fn refresh_segments(&mut self, atlas: &AtlasView) {
        let mut atlas_error = None;
        for segment in &mut self.segments {
            if let Err(err) = segment.refresh(atlas) {
                atlas_error = Some(err);
            }
        }
        if let Some(err) = atlas_error {
            warn!("beam {}: {err}", self.id.0);
        }
    }

    /// Put the beam and its segments into the host's effect layer.
    pub fn attach(&mut self, host: &mut dyn RenderHost) {
        host.attach(NodeId::Beam(self.id), None);
        for segment in &self.segments {
            host.attach(NodeId::Segment(segment.id()), Some(NodeId::Beam(self.id)));
        }
        self.attached = true;
    }

    /// Take the beam out of the host. Segments go with it.
    pub fn detach(&mut self, host: &mut dyn RenderHost) {
        if self.attached {
            host.detach(NodeId::Beam(self.id));
            self.attached = false;
        }
    }

    /// Ask the owning subsystem to tear this beam down.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    /// Make the next clock increment land on frame 0.
    pub fn rewind(&mut self) {
        self.active_time = -1;
    }

    /// Advance one frame: fire due timeline entries, run every live action in
    /// attach order, then tick the clock. Actions fired this frame run this
    /// frame. Once an action retires the beam, remaining actions are skipped.
    pub fn update(&mut self, ctx: &mut BeamContext<'_>) {
        let definitions = ctx.definitions;
        if let Some(def) = definitions.get(self.beam_type) {
            for descriptor in def.triggered_at(self.active_time) {
                let action = Action::new(descriptor.clone(), self);
                self.actions.push(action);
            }
        }

        let pending = std::mem::take(&mut self.actions);
        let mut live = Vec::with_capacity(pending.len());
        for mut action in pending {
            if self.retired {
                break;
            }
            if let ActionState::Pending { .. } = action.update(self, ctx) {
                live.push(action);
            }
        }
        // Anything queued while the pass ran goes after the survivors.
        live.append(&mut self.actions);
        self.actions = live;

        self.active_time += 1;
        if self.retired {
            debug!("beam {} retired at frame {}", self.id.0, self.active_time - 1);
        }
    }
}
