use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a live beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeamId(pub u32);

/// Unique identifier for a beam segment. Never reused after a re-decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub u32);

/// Index into the beam definition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeamTypeId(pub usize);

impl fmt::Display for BeamTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A visual node as seen by the render host.
/// Beams attach to the effect layer; segments attach under their beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Beam(BeamId),
    Segment(SegmentId),
}

/// Monotonic id source for beams and segments.
#[derive(Debug, Default)]
pub struct NodeIds {
    next_beam: u32,
    next_segment: u32,
}

impl NodeIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_beam(&mut self) -> BeamId {
        let id = BeamId(self.next_beam);
        self.next_beam += 1;
        id
    }

    pub fn next_segment(&mut self) -> SegmentId {
        let id = SegmentId(self.next_segment);
        self.next_segment += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_independent() {
        let mut ids = NodeIds::new();
        assert_eq!(ids.next_beam(), BeamId(0));
        assert_eq!(ids.next_beam(), BeamId(1));
        assert_eq!(ids.next_segment(), SegmentId(0));
        assert_eq!(ids.next_beam(), BeamId(2));
    }

    #[test]
    fn beam_type_id_is_a_bare_index_in_json() {
        let id: BeamTypeId = serde_json::from_str("3").unwrap();
        assert_eq!(id, BeamTypeId(3));
    }
}
