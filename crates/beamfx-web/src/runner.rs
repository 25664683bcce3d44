use beamfx::{
    AtlasSize, AtlasSizes, BeamConfig, BeamError, BeamId, BeamSystem, BeamTypeId, CrackleParams,
    SceneGraph, SegmentBuffer,
};
use glam::Vec2;

/// Drives one beam subsystem for a JavaScript host.
///
/// The host owns the actual scene objects; here the scene is mirrored as a
/// [`SceneGraph`] and every tick packs the drawable segments into a flat
/// buffer the host reads through shared memory.
pub struct BeamRunner {
    system: BeamSystem<SceneGraph>,
    buffer: SegmentBuffer,
    /// Image sizes reported so far; the system takes a fresh copy on each change.
    sizes: AtlasSizes,
}

impl BeamRunner {
    pub fn new(config: BeamConfig, definitions_json: &str) -> Result<Self, BeamError> {
        let buffer = SegmentBuffer::with_capacity(config.max_segment_instances);
        let system = BeamSystem::from_json(config, definitions_json)?;
        Ok(Self {
            system,
            buffer,
            sizes: AtlasSizes::new(),
        })
    }

    pub fn system(&self) -> &BeamSystem<SceneGraph> {
        &self.system
    }

    pub fn enter_scene(&mut self) {
        self.system.enter_scene(SceneGraph::new());
    }

    /// Drop every beam and clear the packed buffer.
    pub fn exit_scene(&mut self) {
        self.system.exit_scene();
        self.buffer.clear();
    }

    /// Record an image's size once it has loaded.
    pub fn set_atlas_size(&mut self, filename: &str, width: u32, height: u32) {
        self.sizes.insert(filename, AtlasSize { width, height });
        self.system.set_atlas(self.sizes.clone());
    }

    pub fn create(
        &mut self,
        key: Option<&str>,
        beam_type: usize,
        origin: Vec2,
        target: Vec2,
    ) -> Result<BeamId, BeamError> {
        let handle = self.system.create_beam(key, BeamTypeId(beam_type), origin, target)?;
        Ok(handle.id())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.system.contains_key(key)
    }

    pub fn crackle(&mut self, key: &str, params: &CrackleParams) -> Result<bool, BeamError> {
        match self.system.get_beam(key) {
            Some(mut handle) => handle.crackle(params).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn remove_key(&mut self, key: &str) -> bool {
        self.system
            .get_beam(key)
            .map(|handle| handle.remove())
            .unwrap_or(false)
    }

    pub fn remove(&mut self, id: BeamId) -> bool {
        self.system.remove(id)
    }

    /// Advance all beams one frame and repack the segment buffer.
    pub fn tick(&mut self) {
        self.system.update();
        self.system.render(&mut self.buffer);
    }

    // ---- Pointer accessors for shared-memory reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.buffer.instance_count()
    }

    pub fn instance_floats(&self) -> &[f32] {
        self.buffer.as_floats()
    }

    pub fn beam_count(&self) -> u32 {
        self.system.len() as u32
    }
}
