// api/command.rs
//
// The BEAM action-sequence command used by battle scripting:
//
//   BEAM: <type>, <origin>, <target>
//
// where each endpoint is either `POINT x y` (also POSITION / COORDINATE(S))
// or `<target selector>; <anchor>`, e.g. `user; front center`.
// Selectors are resolved by the caller; this module only knows anchors.

use glam::Vec2;
use log::debug;

use crate::api::host::RenderHost;
use crate::api::types::BeamTypeId;
use crate::error::BeamError;
use crate::systems::beams::BeamSystem;

const COMMAND: &str = "BEAM";

/// Horizontal reference line on a battler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Front,
    Middle,
    Back,
}

/// Vertical reference line on a battler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Base,
    Middle,
    Top,
}

/// Where on a battler a beam endpoint sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    FrontBase,
    Base,
    BackBase,
    FrontCenter,
    Center,
    BackCenter,
    FrontHead,
    Head,
    BackHead,
}

impl Anchor {
    /// Parse an anchor name, case-insensitively. Unknown names return None.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_uppercase();
        let anchor = match name.as_str() {
            "FRONT BASE" | "FRONT" => Self::FrontBase,
            "BASE" => Self::Base,
            "BACK BASE" | "BACK" => Self::BackBase,
            "FRONT CENTER" | "FRONT MIDDLE" => Self::FrontCenter,
            "CENTER" | "MIDDLE" => Self::Center,
            "BACK CENTER" | "BACK MIDDLE" => Self::BackCenter,
            "FRONT HEAD" | "FRONT TOP" => Self::FrontHead,
            "HEAD" | "TOP" => Self::Head,
            "BACK HEAD" | "BACK TOP" => Self::BackHead,
            _ => return None,
        };
        Some(anchor)
    }

    pub fn horizontal(self) -> Horizontal {
        match self {
            Self::FrontBase | Self::FrontCenter | Self::FrontHead => Horizontal::Front,
            Self::Base | Self::Center | Self::Head => Horizontal::Middle,
            Self::BackBase | Self::BackCenter | Self::BackHead => Horizontal::Back,
        }
    }

    pub fn vertical(self) -> Vertical {
        match self {
            Self::FrontBase | Self::Base | Self::BackBase => Vertical::Base,
            Self::FrontCenter | Self::Center | Self::BackCenter => Vertical::Middle,
            Self::FrontHead | Self::Head | Self::BackHead => Vertical::Top,
        }
    }
}

/// Resolves battle target selectors to screen positions.
pub trait TargetResolver {
    /// Screen position of every battler matched by `selector`, at `anchor`.
    fn resolve(&self, selector: &str, anchor: Anchor) -> Vec<Vec2>;
}

/// One end of a scripted beam.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// A fixed screen coordinate.
    Point(Vec2),
    /// Battlers picked by a selector. `anchor` is None for unknown anchor names.
    Targets {
        selector: String,
        anchor: Option<Anchor>,
    },
}

impl Endpoint {
    pub fn parse(text: &str) -> Result<Self, BeamError> {
        if let Some(point) = parse_point(text) {
            return Ok(Self::Point(point));
        }
        if let Some((selector, anchor)) = text.split_once(';') {
            let anchor_name = anchor.strip_prefix(' ').unwrap_or(anchor);
            return Ok(Self::Targets {
                selector: selector.trim().to_uppercase(),
                anchor: Anchor::parse(anchor_name),
            });
        }
        Err(BeamError::invalid_argument(
            COMMAND,
            format!("'{text}' is neither a point nor a target"),
        ))
    }

    /// Expand to concrete points. None aborts the whole command.
    fn points(&self, resolver: &dyn TargetResolver) -> Option<Vec<Vec2>> {
        match self {
            Self::Point(point) => Some(vec![*point]),
            Self::Targets { selector, anchor } => {
                let anchor = (*anchor)?;
                let points = resolver.resolve(selector, anchor);
                if points.is_empty() {
                    None
                } else {
                    Some(points)
                }
            }
        }
    }
}

/// `POINT x y` anywhere in the text, with non-negative integer coordinates.
fn parse_point(text: &str) -> Option<Vec2> {
    let words: Vec<String> = text.split_whitespace().map(str::to_uppercase).collect();
    words.windows(3).find_map(|window| {
        let keyword = matches!(
            window[0].as_str(),
            "POINT" | "POSITION" | "COORDINATE" | "COORDINATES"
        );
        if !keyword {
            return None;
        }
        let x: u32 = window[1].parse().ok()?;
        let y: u32 = window[2].parse().ok()?;
        Some(Vec2::new(x as f32, y as f32))
    })
}

/// A parsed BEAM command.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamCommand {
    pub beam_type: BeamTypeId,
    pub origin: Endpoint,
    pub target: Endpoint,
}

impl BeamCommand {
    /// Parse the command arguments `[type, origin, target]`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, BeamError> {
        let [beam_type, origin, target] = args else {
            return Err(BeamError::invalid_argument(
                COMMAND,
                format!("expected 3 arguments, got {}", args.len()),
            ));
        };
        let beam_type = beam_type
            .as_ref()
            .trim()
            .parse::<usize>()
            .map_err(|_| BeamError::invalid_argument(COMMAND, "beam type must be an index"))?;
        Ok(Self {
            beam_type: BeamTypeId(beam_type),
            origin: Endpoint::parse(origin.as_ref())?,
            target: Endpoint::parse(target.as_ref())?,
        })
    }

    /// Create one unkeyed beam from every origin point to every target point.
    /// Returns how many beams were created; an unresolved endpoint creates none.
    pub fn execute<H: RenderHost>(
        &self,
        system: &mut BeamSystem<H>,
        resolver: &dyn TargetResolver,
    ) -> Result<usize, BeamError> {
        let (Some(origins), Some(targets)) = (self.origin.points(resolver), self.target.points(resolver)) else {
            debug!("beams: BEAM command resolved no endpoints");
            return Ok(0);
        };
        let mut created = 0;
        for from in &origins {
            for to in &targets {
                system.create_beam(None, self.beam_type, *from, *to)?;
                created += 1;
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::BeamConfig;
    use crate::assets::definitions::{BeamDefinitions, BeamTypeDefinition};
    use crate::core::scene::SceneGraph;

    struct Party;

    impl TargetResolver for Party {
        fn resolve(&self, selector: &str, anchor: Anchor) -> Vec<Vec2> {
            let x = match anchor.horizontal() {
                Horizontal::Front => 10.0,
                Horizontal::Middle => 20.0,
                Horizontal::Back => 30.0,
            };
            match selector {
                "USER" => vec![Vec2::new(x, 100.0)],
                "ALL ENEMIES" => vec![Vec2::new(x, 200.0), Vec2::new(x, 300.0)],
                _ => Vec::new(),
            }
        }
    }

    fn system() -> BeamSystem<SceneGraph> {
        let defs = BeamDefinitions::new(vec![Some(BeamTypeDefinition { image_row: 0, timeline: Vec::new() })]);
        let mut system = BeamSystem::new(BeamConfig::default(), defs);
        system.enter_scene(SceneGraph::new());
        system
    }

    #[test]
    fn parse_points_and_targets() {
        let cmd = BeamCommand::parse(&["0", "point 12 34", "all enemies; Front Center"]).unwrap();
        assert_eq!(cmd.beam_type, BeamTypeId(0));
        assert_eq!(cmd.origin, Endpoint::Point(Vec2::new(12.0, 34.0)));
        assert_eq!(
            cmd.target,
            Endpoint::Targets { selector: "ALL ENEMIES".into(), anchor: Some(Anchor::FrontCenter) }
        );
    }

    #[test]
    fn point_keyword_variants() {
        assert_eq!(parse_point("COORDINATES 1 2"), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(parse_point("at position 5 6"), Some(Vec2::new(5.0, 6.0)));
        assert_eq!(parse_point("point -1 2"), None);
    }

    #[test]
    fn anchors_split_into_lines() {
        assert_eq!(Anchor::parse("back top"), Some(Anchor::BackHead));
        assert_eq!(Anchor::parse("FRONT"), Some(Anchor::FrontBase));
        assert_eq!(Anchor::parse("sideways"), None);
        assert_eq!(Anchor::BackHead.horizontal(), Horizontal::Back);
        assert_eq!(Anchor::BackHead.vertical(), Vertical::Top);
        assert_eq!(Anchor::Center.vertical(), Vertical::Middle);
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert!(BeamCommand::parse(&["0", "point 1 1"]).is_err());
        assert!(BeamCommand::parse(&["fire", "point 1 1", "point 2 2"]).is_err());
        assert!(BeamCommand::parse(&["0", "somewhere", "point 2 2"]).is_err());
    }

    #[test]
    fn execute_creates_every_pair() {
        let mut system = system();
        let cmd = BeamCommand::parse(&["0", "user; middle", "all enemies; front"]).unwrap();
        assert_eq!(cmd.execute(&mut system, &Party).unwrap(), 2);
        assert_eq!(system.len(), 2);
        let first = system.beams().next().unwrap();
        assert_eq!(first.origin, Vec2::new(20.0, 100.0));
        assert_eq!(first.target, Vec2::new(10.0, 200.0));
        assert!(first.key().is_none());
    }

    #[test]
    fn unresolved_endpoints_create_nothing() {
        let mut system = system();
        let nobody = BeamCommand::parse(&["0", "nobody; center", "point 1 1"]).unwrap();
        assert_eq!(nobody.execute(&mut system, &Party).unwrap(), 0);
        let bad_anchor = BeamCommand::parse(&["0", "user; elbow", "point 1 1"]).unwrap();
        assert_eq!(bad_anchor.execute(&mut system, &Party).unwrap(), 0);
        assert!(system.is_empty());
    }
}
