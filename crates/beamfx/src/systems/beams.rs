// systems/beams.rs
//
// The beam subsystem: owns every live beam, the keyed pool, and the shared
// resources beams borrow while they update.
//
// Usage:
//   let mut beams = BeamSystem::from_json(BeamConfig::default(), &definitions_json)?;
//   beams.enter_scene(host);
//   beams.create_beam(Some("bolt"), BeamTypeId(1), from, to)?.crackle(&params)?;
//   beams.update();              // once per frame
//   beams.render(&mut buffer);   // pack segments for the renderer
//   let host = beams.exit_scene();

use std::collections::HashMap;

use glam::Vec2;
use log::{debug, info, warn};

use crate::api::config::BeamConfig;
use crate::api::host::{AtlasProvider, RenderHost};
use crate::api::types::{BeamId, BeamTypeId, NodeIds};
use crate::assets::atlas::{AtlasSizes, AtlasView};
use crate::assets::definitions::BeamDefinitions;
use crate::components::beam::Beam;
use crate::core::geometry::CrackleParams;
use crate::core::rng::{RandomSource, Rng};
use crate::error::BeamError;
use crate::renderer::instance::{SegmentBuffer, SegmentInstance};
use crate::systems::context::{BeamContext, DeferredCall};
use crate::systems::operations::OperationTable;

/// Owns all live beams for one scene and drives them once per frame.
///
/// At most one live beam exists per key: creating under a used key retires
/// the previous beam first. Beams update in creation order, which is also
/// the order they were attached to the host.
pub struct BeamSystem<H: RenderHost> {
    config: BeamConfig,
    definitions: BeamDefinitions,
    operations: OperationTable,
    atlas: Box<dyn AtlasProvider>,
    rng: Box<dyn RandomSource>,
    host: Option<H>,
    beams: Vec<Beam>,
    pool: HashMap<String, BeamId>,
    ids: NodeIds,
    deferred: Vec<DeferredCall>,
}

impl<H: RenderHost> BeamSystem<H> {
    pub fn new(config: BeamConfig, definitions: BeamDefinitions) -> Self {
        info!("beams: loaded {} beam type slots", definitions.len());
        let rng = Rng::new(config.seed);
        Self {
            config,
            definitions,
            operations: OperationTable::with_builtins(),
            atlas: Box::new(AtlasSizes::new()),
            rng: Box::new(rng),
            host: None,
            beams: Vec::new(),
            pool: HashMap::new(),
            ids: NodeIds::new(),
            deferred: Vec::new(),
        }
    }

    /// Build from the JSON effect-definition file.
    pub fn from_json(config: BeamConfig, definitions_json: &str) -> Result<Self, BeamError> {
        let definitions = BeamDefinitions::from_json(definitions_json)?;
        Ok(Self::new(config, definitions))
    }

    pub fn with_atlas(mut self, atlas: impl AtlasProvider + 'static) -> Self {
        self.set_atlas(atlas);
        self
    }

    /// Replace the crackle randomness (e.g. a scripted source for replays).
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Swap the atlas provider and re-slice every live segment against it.
    pub fn set_atlas(&mut self, atlas: impl AtlasProvider + 'static) {
        self.atlas = Box::new(atlas);
        let view = self.atlas_view();
        for beam in &mut self.beams {
            beam.refresh_segments(&view);
        }
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    pub fn definitions(&self) -> &BeamDefinitions {
        &self.definitions
    }

    /// Register extra operations for function actions.
    pub fn operations_mut(&mut self) -> &mut OperationTable {
        &mut self.operations
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    /// Install the scene's render host. A previous scene is exited first.
    pub fn enter_scene(&mut self, host: H) {
        if self.host.is_some() {
            self.exit_scene();
        }
        self.host = Some(host);
        debug!("beams: scene entered");
    }

    /// Retire every beam and hand the host back.
    pub fn exit_scene(&mut self) -> Option<H> {
        let mut beams = std::mem::take(&mut self.beams);
        for beam in &mut beams {
            self.teardown(beam);
        }
        self.pool.clear();
        self.deferred.clear();
        debug!("beams: scene exited, {} beams retired", beams.len());
        self.host.take()
    }

    fn atlas_view(&self) -> AtlasView {
        AtlasView {
            filename: self.config.image.filename.clone(),
            size: self.atlas.get(&self.config.image.filename),
            rows: self.config.image.rows,
        }
    }

    /// Split `self` into the beam list, pool and a context over everything else.
    fn parts(&mut self) -> (&mut Vec<Beam>, &mut HashMap<String, BeamId>, BeamContext<'_>) {
        let atlas = self.atlas_view();
        let ctx = BeamContext {
            host: self.host.as_mut().map(|host| host as &mut dyn RenderHost),
            definitions: &self.definitions,
            operations: &self.operations,
            atlas,
            rng: &mut *self.rng,
            ids: &mut self.ids,
            deferred: &mut self.deferred,
        };
        (&mut self.beams, &mut self.pool, ctx)
    }

    /// Create a beam and attach it to the host's effect layer.
    ///
    /// With a key, any beam already pooled under it is retired first.
    ///
    /// Without an active scene this returns [`BeamError::NoRenderHost`] and
    /// builds nothing: no detached beam is constructed, nothing is pooled,
    /// and a beam already under `key` is left alone. A detached, unpooled
    /// beam could never be reached again through the pool, so no handle is
    /// handed out for it.
    pub fn create_beam(
        &mut self,
        key: Option<&str>,
        beam_type: BeamTypeId,
        origin: Vec2,
        target: Vec2,
    ) -> Result<BeamHandle<'_, H>, BeamError> {
        if self.host.is_none() {
            warn!("beams: {}", BeamError::NoRenderHost);
            return Err(BeamError::NoRenderHost);
        }
        if let Some(old) = key.and_then(|k| self.pool.get(k).copied()) {
            self.remove(old);
        }

        let id = self.ids.next_beam();
        let (beams, pool, mut ctx) = self.parts();
        let mut beam = Beam::new(id, key.map(str::to_owned), beam_type, origin, target, &mut ctx);
        if let Some(host) = ctx.host.as_deref_mut() {
            beam.attach(host);
        }
        beams.push(beam);
        if let Some(key) = key {
            pool.insert(key.to_owned(), id);
        }
        debug!("beams: created beam {} (type {beam_type})", id.0);
        Ok(BeamHandle { system: self, id })
    }

    /// Handle to the beam pooled under `key`.
    pub fn get_beam(&mut self, key: &str) -> Option<BeamHandle<'_, H>> {
        let id = *self.pool.get(key)?;
        Some(BeamHandle { system: self, id })
    }

    /// Handle to any live beam, keyed or not.
    pub fn handle(&mut self, id: BeamId) -> Option<BeamHandle<'_, H>> {
        self.beam(id)?;
        Some(BeamHandle { system: self, id })
    }

    pub fn beam(&self, id: BeamId) -> Option<&Beam> {
        self.beams.iter().find(|b| b.id() == id)
    }

    pub fn find(&self, key: &str) -> Option<&Beam> {
        self.beam(*self.pool.get(key)?)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pool.contains_key(key)
    }

    /// Live beams in update order.
    pub fn beams(&self) -> impl Iterator<Item = &Beam> {
        self.beams.iter()
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// Run `f` against one beam with a context over the rest of the system.
    fn with_beam<R>(
        &mut self,
        id: BeamId,
        f: impl FnOnce(&mut Beam, &mut BeamContext<'_>) -> R,
    ) -> Option<R> {
        let (beams, _, mut ctx) = self.parts();
        let beam = beams.iter_mut().find(|b| b.id() == id)?;
        Some(f(beam, &mut ctx))
    }

    pub fn crackle(&mut self, id: BeamId, params: &CrackleParams) -> Result<(), BeamError> {
        self.with_beam(id, |beam, ctx| beam.crackle(params, ctx))
            .unwrap_or(Ok(()))
    }

    pub fn set_segments(&mut self, id: BeamId, count: usize) -> Result<(), BeamError> {
        self.with_beam(id, |beam, ctx| beam.set_segments(count, ctx))
            .unwrap_or(Ok(()))
    }

    pub fn set_beam_type(&mut self, id: BeamId, beam_type: BeamTypeId) -> Result<(), BeamError> {
        self.with_beam(id, |beam, ctx| beam.set_beam_type(beam_type, ctx))
            .unwrap_or(Ok(()))
    }

    /// Call a registered operation on a beam, as a function action would.
    pub fn call(&mut self, id: BeamId, name: &str, args: &[serde_json::Value]) -> Result<(), BeamError> {
        let result = self
            .with_beam(id, |beam, ctx| {
                let operations = ctx.operations;
                operations.call(name, beam, args, ctx)
            })
            .unwrap_or(Ok(()));
        self.sweep_retired();
        result
    }

    /// Detach a beam from the host and drop it from the pool.
    /// Returns false if no such beam is live.
    pub fn remove(&mut self, id: BeamId) -> bool {
        let Some(index) = self.beams.iter().position(|b| b.id() == id) else {
            return false;
        };
        let mut beam = self.beams.remove(index);
        self.teardown(&mut beam);
        true
    }

    fn teardown(&mut self, beam: &mut Beam) {
        beam.retire();
        if let Some(key) = beam.key() {
            if self.pool.get(key) == Some(&beam.id()) {
                self.pool.remove(key);
            }
        }
        if let Some(host) = self.host.as_mut() {
            beam.detach(host);
        }
    }

    /// Advance every beam one frame.
    ///
    /// Beams update in order; function calls aimed at other beams run after
    /// the pass, and beams retired during the frame are torn down last.
    pub fn update(&mut self) {
        {
            let (beams, _, mut ctx) = self.parts();
            for beam in beams.iter_mut() {
                if !beam.is_retired() {
                    beam.update(&mut ctx);
                }
            }
        }
        self.run_deferred();
        self.sweep_retired();
    }

    fn run_deferred(&mut self) {
        let calls = std::mem::take(&mut self.deferred);
        for call in calls {
            let Some(id) = self.pool.get(&call.receiver).copied() else {
                warn!(
                    "beams: {}",
                    BeamError::UnknownOperation(format!("{} on missing beam '{}'", call.name, call.receiver))
                );
                continue;
            };
            let result = self.with_beam(id, |beam, ctx| {
                let operations = ctx.operations;
                operations.call(&call.name, beam, &call.args, ctx)
            });
            if let Some(Err(err)) = result {
                warn!("beam {}: {err}", id.0);
            }
        }
    }

    fn sweep_retired(&mut self) {
        let mut index = 0;
        while index < self.beams.len() {
            if self.beams[index].is_retired() {
                let mut beam = self.beams.remove(index);
                self.teardown(&mut beam);
                debug!("beams: beam {} torn down", beam.id().0);
            } else {
                index += 1;
            }
        }
    }

    /// Pack every drawable segment, in update order, for the renderer.
    pub fn render(&self, buffer: &mut SegmentBuffer) {
        buffer.clear();
        for beam in self.beams.iter().filter(|b| b.is_attached()) {
            for sprite in beam.segments().iter().filter_map(|s| s.sprite()) {
                buffer.push(SegmentInstance::from_sprite(sprite));
            }
        }
    }
}

/// Borrowed access to one live beam, as handed to game scripting.
pub struct BeamHandle<'a, H: RenderHost> {
    system: &'a mut BeamSystem<H>,
    id: BeamId,
}

impl<'a, H: RenderHost> BeamHandle<'a, H> {
    pub fn id(&self) -> BeamId {
        self.id
    }

    pub fn beam(&self) -> Option<&Beam> {
        self.system.beam(self.id)
    }

    pub fn crackle(&mut self, params: &CrackleParams) -> Result<(), BeamError> {
        self.system.crackle(self.id, params)
    }

    pub fn set_segments(&mut self, count: usize) -> Result<(), BeamError> {
        self.system.set_segments(self.id, count)
    }

    pub fn set_beam_type(&mut self, beam_type: BeamTypeId) -> Result<(), BeamError> {
        self.system.set_beam_type(self.id, beam_type)
    }

    pub fn call(&mut self, name: &str, args: &[serde_json::Value]) -> Result<(), BeamError> {
        self.system.call(self.id, name, args)
    }

    /// Retire the beam now.
    pub fn remove(self) -> bool {
        self.system.remove(self.id)
    }
}
