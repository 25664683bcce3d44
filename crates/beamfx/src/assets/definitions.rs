use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::types::BeamTypeId;

/// All beam types, loaded once from the effect-definition file.
///
/// The file is a JSON array indexed by [`BeamTypeId`]. `null` entries are
/// allowed so hand-authored data can leave index 0 unused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeamDefinitions {
    types: Vec<Option<BeamTypeDefinition>>,
}

/// One beam type: which atlas row it draws from and its scripted timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamTypeDefinition {
    pub image_row: u32,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

/// An action scheduled on a beam's clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub frame: u32,
    pub action: ActionDescriptor,
}

/// What an action does, plus how many frames it runs for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Frames to run. Absent or zero means a single tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionKind {
    /// Move a numeric beam field linearly to `to`.
    Tween { variable: TweenField, to: f32 },
    /// Retire the whole beam.
    Remove {},
    /// Call a registered operation by name.
    Function {
        name: String,
        #[serde(default)]
        args: Vec<Value>,
        /// Key of another pooled beam to call the operation on instead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },
    /// Restart the beam's timeline from frame 0.
    Rewind {},
}

/// Numeric beam state a tween can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TweenField {
    #[serde(rename = "origin.x", alias = "_beamOrigin.x")]
    OriginX,
    #[serde(rename = "origin.y", alias = "_beamOrigin.y")]
    OriginY,
    #[serde(rename = "target.x", alias = "_beamTarget.x")]
    TargetX,
    #[serde(rename = "target.y", alias = "_beamTarget.y")]
    TargetY,
}

impl ActionDescriptor {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, over: None }
    }

    pub fn over(mut self, frames: u32) -> Self {
        self.over = Some(frames);
        self
    }

    pub fn tween(variable: TweenField, to: f32, over: u32) -> Self {
        Self::new(ActionKind::Tween { variable, to }).over(over)
    }

    pub fn remove() -> Self {
        Self::new(ActionKind::Remove {})
    }

    pub fn rewind() -> Self {
        Self::new(ActionKind::Rewind {})
    }

    pub fn function(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::new(ActionKind::Function {
            name: name.into(),
            args,
            context: None,
        })
    }
}

impl BeamTypeDefinition {
    /// Actions scheduled for `frame`, in timeline order.
    pub fn triggered_at(&self, frame: i32) -> impl Iterator<Item = &ActionDescriptor> + '_ {
        let frame = u32::try_from(frame).ok();
        self.timeline
            .iter()
            .filter(move |entry| Some(entry.frame) == frame)
            .map(|entry| &entry.action)
    }
}

impl BeamDefinitions {
    pub fn new(types: Vec<Option<BeamTypeDefinition>>) -> Self {
        Self { types }
    }

    /// Parse definitions from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a beam type. Returns None if the id is out of range or unset.
    pub fn get(&self, id: BeamTypeId) -> Option<&BeamTypeDefinition> {
        self.types.get(id.0).and_then(Option::as_ref)
    }

    /// Number of slots, including empty ones.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_beam_file() {
        let json = r#"[
            null,
            {
                "imageRow": 1,
                "timeline": [
                    { "frame": 0, "action": { "type": "tween", "variable": "_beamTarget.x", "to": 100, "over": 10 } },
                    { "frame": 0, "action": { "type": "function", "name": "crackle", "args": [4, 5, 20] } },
                    { "frame": 10, "action": { "type": "rewind" } },
                    { "frame": 30, "action": { "type": "remove" } }
                ]
            }
        ]"#;
        let defs = BeamDefinitions::from_json(json).unwrap();
        assert_eq!(defs.len(), 2);
        assert!(defs.get(BeamTypeId(0)).is_none());
        assert!(defs.get(BeamTypeId(5)).is_none());

        let beam = defs.get(BeamTypeId(1)).unwrap();
        assert_eq!(beam.image_row, 1);
        assert_eq!(beam.timeline.len(), 4);
        assert_eq!(
            beam.timeline[0].action,
            ActionDescriptor::tween(TweenField::TargetX, 100.0, 10)
        );
        assert_eq!(beam.timeline[2].action, ActionDescriptor::rewind());
        assert_eq!(beam.timeline[3].action, ActionDescriptor::remove());
        match &beam.timeline[1].action.kind {
            ActionKind::Function { name, args, context } => {
                assert_eq!(name, "crackle");
                assert_eq!(args.len(), 3);
                assert!(context.is_none());
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn triggered_at_keeps_timeline_order() {
        let def = BeamTypeDefinition {
            image_row: 0,
            timeline: vec![
                TimelineEntry { frame: 2, action: ActionDescriptor::rewind() },
                TimelineEntry { frame: 1, action: ActionDescriptor::remove() },
                TimelineEntry { frame: 2, action: ActionDescriptor::remove() },
            ],
        };
        let fired: Vec<_> = def.triggered_at(2).cloned().collect();
        assert_eq!(fired, vec![ActionDescriptor::rewind(), ActionDescriptor::remove()]);
        assert_eq!(def.triggered_at(-1).count(), 0);
    }

    #[test]
    fn tween_fields_accept_short_names() {
        let field: TweenField = serde_json::from_str(r#""origin.y""#).unwrap();
        assert_eq!(field, TweenField::OriginY);
        assert!(serde_json::from_str::<TweenField>(r#""_beamTarget.z""#).is_err());
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let json = r#"[{ "imageRow": 0, "timeline": [{ "frame": 0, "action": { "type": "explode" } }] }]"#;
        assert!(BeamDefinitions::from_json(json).is_err());
    }

    #[test]
    fn missing_timeline_defaults_to_empty() {
        let defs = BeamDefinitions::from_json(r#"[{ "imageRow": 3 }]"#).unwrap();
        assert!(defs.get(BeamTypeId(0)).unwrap().timeline.is_empty());
    }
}
