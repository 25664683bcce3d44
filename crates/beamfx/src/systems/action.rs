// systems/action.rs
//
// Timed behaviours running against a single beam.
//
// An action is created when its timeline frame is reached and updated once
// per beam update until its countdown runs out:
//
//   Pending(n) --update--> run kind logic --> Pending(n - 1) | Retired
//
// A countdown of -1 (no `over`) runs exactly once.

use log::{debug, warn};

use crate::assets::definitions::{ActionDescriptor, ActionKind};
use crate::components::beam::Beam;
use crate::systems::context::{BeamContext, DeferredCall};

/// Lifecycle of a live action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Still running. `remaining` frames until it retires; -1 means no countdown.
    Pending { remaining: i32 },
    /// Finished; dropped from the beam's action list.
    Retired,
}

/// A running instance of an [`ActionDescriptor`].
#[derive(Debug, Clone)]
pub struct Action {
    descriptor: ActionDescriptor,
    state: ActionState,
    /// Tween start value, captured when the action fired.
    initial: Option<f32>,
}

impl Action {
    /// Instantiate a descriptor against `beam`, snapshotting tween start values.
    pub fn new(descriptor: ActionDescriptor, beam: &Beam) -> Self {
        let remaining = match descriptor.over {
            Some(frames) if frames > 0 => i32::try_from(frames).unwrap_or(i32::MAX),
            _ => -1,
        };
        let initial = match descriptor.kind {
            ActionKind::Tween { variable, .. } => Some(beam.field(variable)),
            _ => None,
        };
        Self {
            descriptor,
            state: ActionState::Pending { remaining },
            initial,
        }
    }

    pub fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Frames left on the countdown, -1 for single-shot actions.
    pub fn remaining(&self) -> Option<i32> {
        match self.state {
            ActionState::Pending { remaining } => Some(remaining),
            ActionState::Retired => None,
        }
    }

    /// Run one frame of this action against its beam.
    pub fn update(&mut self, beam: &mut Beam, ctx: &mut BeamContext<'_>) -> ActionState {
        let ActionState::Pending { mut remaining } = self.state else {
            return ActionState::Retired;
        };
        if remaining > 0 {
            remaining -= 1;
        }

        self.run(beam, ctx, remaining);

        self.state = if remaining <= 0 {
            ActionState::Retired
        } else {
            ActionState::Pending { remaining }
        };
        self.state
    }

    fn run(&self, beam: &mut Beam, ctx: &mut BeamContext<'_>, remaining: i32) {
        match &self.descriptor.kind {
            ActionKind::Tween { variable, to } => {
                let from = self.initial.unwrap_or(*to);
                match self.descriptor.over {
                    // The step is fixed from the snapshot; the last tick lands exactly.
                    Some(over) if over > 0 && remaining > 0 => {
                        let step = (to - from) / over as f32;
                        beam.set_field(*variable, beam.field(*variable) + step);
                    }
                    _ => beam.set_field(*variable, *to),
                }
            }
            ActionKind::Remove {} => {
                debug!("beam {}: remove action", beam.id().0);
                beam.retire();
            }
            ActionKind::Function { name, args, context } => match context {
                Some(receiver) if Some(receiver.as_str()) != beam.key() => {
                    ctx.deferred.push(DeferredCall {
                        receiver: receiver.clone(),
                        name: name.clone(),
                        args: args.clone(),
                    });
                }
                _ => {
                    let operations = ctx.operations;
                    if let Err(err) = operations.call(name, beam, args, ctx) {
                        warn!("beam {}: {err}", beam.id().0);
                    }
                }
            },
            ActionKind::Rewind {} => beam.rewind(),
        }
    }
}
