// systems/operations.rs
//
// Named operations a `function` timeline action can call on a beam.
// Lookup is by string key only; unknown names are reported, never evaluated.

use std::collections::HashMap;

use glam::Vec2;
use serde_json::Value;

use crate::api::types::BeamTypeId;
use crate::components::beam::Beam;
use crate::core::geometry::CrackleParams;
use crate::error::BeamError;
use crate::systems::context::BeamContext;

/// A callable registered under a name.
pub type Operation = Box<dyn Fn(&mut Beam, &[Value], &mut BeamContext<'_>) -> Result<(), BeamError>>;

/// Name -> operation lookup used by function actions.
///
/// `new()` and `Default` give an empty table; `with_builtins()` is what a
/// `BeamSystem` starts with.
#[derive(Default)]
pub struct OperationTable {
    ops: HashMap<String, Operation>,
}

impl OperationTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the built-in beam operations:
    /// `crackle`, `setSegments`, `setBeamType`, `setOrigin`, `setTarget`, `remove`.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("crackle", crackle);
        table.register("setSegments", set_segments);
        table.register("setBeamType", set_beam_type);
        table.register("setOrigin", set_origin);
        table.register("setTarget", set_target);
        table.register("remove", remove);
        table
    }

    /// Add or replace an operation.
    pub fn register<F>(&mut self, name: impl Into<String>, op: F)
    where
        F: Fn(&mut Beam, &[Value], &mut BeamContext<'_>) -> Result<(), BeamError> + 'static,
    {
        self.ops.insert(name.into(), Box::new(op));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Call `name` on `beam` with the arguments passed through verbatim.
    pub fn call(
        &self,
        name: &str,
        beam: &mut Beam,
        args: &[Value],
        ctx: &mut BeamContext<'_>,
    ) -> Result<(), BeamError> {
        let op = self
            .ops
            .get(name)
            .ok_or_else(|| BeamError::UnknownOperation(name.to_owned()))?;
        op(beam, args, ctx)
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn number(op: &str, args: &[Value], index: usize) -> Result<f64, BeamError> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| BeamError::invalid_argument(op, format!("argument {index} must be a number")))
}

fn count(op: &str, args: &[Value], index: usize) -> Result<usize, BeamError> {
    let value = number(op, args, index)?;
    if value < 0.0 {
        return Err(BeamError::invalid_argument(op, format!("argument {index} must not be negative")));
    }
    Ok(value as usize)
}

fn point(op: &str, args: &[Value]) -> Result<Vec2, BeamError> {
    Ok(Vec2::new(number(op, args, 0)? as f32, number(op, args, 1)? as f32))
}

/// `crackle(segmentCount, minAngle, maxAngle, overlapPixels?)`
fn crackle(beam: &mut Beam, args: &[Value], ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
    let params = CrackleParams {
        segment_count: count("crackle", args, 0)?,
        min_angle: number("crackle", args, 1)? as f32,
        max_angle: number("crackle", args, 2)? as f32,
        // Anything that is not a number means no overlap.
        overlap: args.get(3).and_then(Value::as_f64).unwrap_or(0.0) as f32,
    };
    beam.crackle(&params, ctx)
}

/// `setSegments(count)`
fn set_segments(beam: &mut Beam, args: &[Value], ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
    let segments = count("setSegments", args, 0)?;
    beam.set_segments(segments, ctx)
}

/// `setBeamType(typeId)`
fn set_beam_type(beam: &mut Beam, args: &[Value], ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
    let id = count("setBeamType", args, 0)?;
    beam.set_beam_type(BeamTypeId(id), ctx)
}

/// `setOrigin(x, y)`
fn set_origin(beam: &mut Beam, args: &[Value], _ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
    beam.origin = point("setOrigin", args)?;
    Ok(())
}

/// `setTarget(x, y)`
fn set_target(beam: &mut Beam, args: &[Value], _ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
    beam.target = point("setTarget", args)?;
    Ok(())
}

/// `remove()`
fn remove(beam: &mut Beam, _args: &[Value], _ctx: &mut BeamContext<'_>) -> Result<(), BeamError> {
    beam.retire();
    Ok(())
}
