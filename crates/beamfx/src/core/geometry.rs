// core/geometry.rs
//
// Pure segment math for beams. No dependencies on Beam/host state.
//
// Angles are radians unless a name says otherwise; crackle jitter is
// authored in degrees.

use glam::Vec2;

use super::rng::RandomSource;

/// Crackle segments are this much longer than an even split so the jittered
/// path does not fall short of the target.
pub const CRACKLE_LENGTH_FACTOR: f32 = 1.2;

/// Euclidean distance between two points.
#[inline]
pub fn distance_to(from: Vec2, to: Vec2) -> f32 {
    from.distance(to)
}

/// Angle of the line `from -> to`, in radians.
#[inline]
pub fn rotation_to(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// The point `length` units away from `from` in direction `angle` (radians).
#[inline]
pub fn length_dir(from: Vec2, length: f32, angle: f32) -> Vec2 {
    from + Vec2::new(angle.cos(), angle.sin()) * length
}

/// One straight piece of a beam path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLine {
    pub origin: Vec2,
    pub target: Vec2,
}

impl SegmentLine {
    pub fn new(origin: Vec2, target: Vec2) -> Self {
        Self { origin, target }
    }

    pub fn length(&self) -> f32 {
        distance_to(self.origin, self.target)
    }

    pub fn rotation(&self) -> f32 {
        rotation_to(self.origin, self.target)
    }
}

/// Jitter parameters for [`decompose_crackle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrackleParams {
    /// Number of segments; values below 2 are raised to 2.
    pub segment_count: usize,
    /// Minimum deviation from the straight line, in degrees.
    pub min_angle: f32,
    /// Maximum deviation from the straight line, in degrees.
    pub max_angle: f32,
    /// Pixels each segment start is pulled back over the previous one.
    pub overlap: f32,
}

impl CrackleParams {
    pub fn new(segment_count: usize, min_angle: f32, max_angle: f32) -> Self {
        Self {
            segment_count,
            min_angle,
            max_angle,
            overlap: 0.0,
        }
    }

    pub fn with_overlap(mut self, overlap: f32) -> Self {
        self.overlap = overlap;
        self
    }
}

/// Split `origin -> target` into `segment_count` collinear pieces.
///
/// Every piece but the last is `ceil(distance / count)` long; the last one
/// ends exactly on `target`. Rounding up never carries a piece past
/// `target`: once the running distance reaches it, the remaining pieces
/// collapse onto `target`. A count of 0 is treated as 1.
pub fn decompose_straight(origin: Vec2, target: Vec2, segment_count: usize) -> Vec<SegmentLine> {
    let count = segment_count.max(1);
    let distance = distance_to(origin, target);
    let length = (distance / count as f32).ceil();
    let angle = rotation_to(origin, target);

    let mut lines = Vec::with_capacity(count);
    let mut from = origin;
    for i in 0..count {
        let travelled = length * (i + 1) as f32;
        let to = if i + 1 == count || travelled >= distance {
            target
        } else {
            length_dir(origin, travelled, angle)
        };
        lines.push(SegmentLine::new(from, to));
        from = to;
    }
    lines
}

/// Split `origin -> target` into a jagged chain, lightning style.
///
/// Each non-final segment deviates from the straight-line angle by a random
/// magnitude in `[min_angle, max_angle]` degrees with a random sign. The final
/// segment always ends exactly on `target`. With a positive overlap, every
/// segment after the first starts `overlap` pixels back along the previous
/// segment to hide the seams left by rotation.
pub fn decompose_crackle<R>(
    origin: Vec2,
    target: Vec2,
    params: &CrackleParams,
    rng: &mut R,
) -> Vec<SegmentLine>
where
    R: RandomSource + ?Sized,
{
    let count = params.segment_count.max(2);
    let length = (distance_to(origin, target) / count as f32).ceil() * CRACKLE_LENGTH_FACTOR;
    let base_degrees = rotation_to(origin, target).to_degrees();

    let mut lines: Vec<SegmentLine> = Vec::with_capacity(count);
    let mut start = origin;
    for i in 0..count {
        if params.overlap > 0.0 {
            if let Some(previous) = lines.last() {
                let back = rotation_to(previous.target, previous.origin);
                start = length_dir(previous.target, params.overlap, back);
            }
        }

        let end = if i + 1 < count {
            let spread = params.min_angle + rng.next_f32() * (params.max_angle - params.min_angle);
            let sign = if rng.next_f32() < 0.5 { 1.0 } else { -1.0 };
            length_dir(start, length, (base_degrees + spread * sign).to_radians())
        } else {
            target
        };

        lines.push(SegmentLine::new(start, end));
        start = end;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{Rng, ScriptedRandom};

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn straight_split_into_even_pieces() {
        let lines = decompose_straight(Vec2::ZERO, Vec2::new(100.0, 0.0), 4);
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert!((line.length() - 25.0).abs() < 1e-4);
            assert_eq!(line.rotation(), 0.0);
        }
    }

    #[test]
    fn straight_single_segment_spans_everything() {
        let lines = decompose_straight(Vec2::new(3.0, 4.0), Vec2::new(-20.0, 50.0), 1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].origin, Vec2::new(3.0, 4.0));
        assert_eq!(lines[0].target, Vec2::new(-20.0, 50.0));
    }

    #[test]
    fn straight_chain_has_no_gaps() {
        let origin = Vec2::new(10.0, -5.0);
        let target = Vec2::new(-130.0, 77.0);
        for count in 1..12 {
            let lines = decompose_straight(origin, target, count);
            assert_eq!(lines.len(), count);
            assert_eq!(lines[0].origin, origin);
            for pair in lines.windows(2) {
                assert_eq!(pair[0].target, pair[1].origin);
            }
            assert!(close(lines[count - 1].target, target));
        }
    }

    #[test]
    fn straight_short_beam_with_many_pieces_never_overshoots() {
        let target = Vec2::new(10.0, 0.0);
        let lines = decompose_straight(Vec2::ZERO, target, 7);
        assert_eq!(lines.len(), 7);
        for line in &lines {
            assert!(line.origin.x <= 10.0 && line.target.x <= 10.0, "past target: {line:?}");
            assert!(line.target.x >= line.origin.x, "points backwards: {line:?}");
            assert_eq!(line.rotation(), 0.0);
        }
        assert_eq!(lines[4], SegmentLine::new(Vec2::new(8.0, 0.0), target));
        assert_eq!(lines[6], SegmentLine::new(target, target));
    }

    #[test]
    fn straight_diagonal_pieces_stay_between_endpoints() {
        let origin = Vec2::new(5.0, 5.0);
        let target = Vec2::new(8.0, 9.0);
        let total = origin.distance(target);
        let lines = decompose_straight(origin, target, 9);
        let mut reached = 0.0;
        for line in &lines {
            let along = origin.distance(line.target);
            assert!(along >= reached - 1e-4);
            assert!(along <= total + 1e-4);
            reached = along;
        }
        assert_eq!(lines[8].target, target);
    }

    #[test]
    fn straight_zero_count_is_one() {
        assert_eq!(decompose_straight(Vec2::ZERO, Vec2::ONE, 0).len(), 1);
    }

    #[test]
    fn crackle_ends_on_target_and_respects_angle_bounds() {
        let origin = Vec2::ZERO;
        let target = Vec2::new(300.0, 0.0);
        let params = CrackleParams::new(6, 10.0, 35.0);
        let mut rng = Rng::new(99);
        for _ in 0..50 {
            let lines = decompose_crackle(origin, target, &params, &mut rng);
            assert_eq!(lines.len(), 6);
            assert_eq!(lines[5].target, target);
            for line in &lines[..5] {
                let deviation = line.rotation().to_degrees().abs();
                assert!(deviation >= 10.0 - 1e-3, "deviation {deviation}");
                assert!(deviation <= 35.0 + 1e-3, "deviation {deviation}");
            }
        }
    }

    #[test]
    fn crackle_raises_count_to_two() {
        let mut rng = Rng::new(1);
        let lines = decompose_crackle(Vec2::ZERO, Vec2::new(50.0, 0.0), &CrackleParams::new(1, 5.0, 5.0), &mut rng);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].target, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn crackle_uses_injected_randomness() {
        // spread = 10 + 0.5 * (30 - 10) = 20 degrees, sign from 0.9 -> negative.
        let mut rng = ScriptedRandom::new(vec![0.5, 0.9]);
        let lines = decompose_crackle(
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            &CrackleParams::new(2, 10.0, 30.0),
            &mut rng,
        );
        assert!((lines[0].rotation().to_degrees() + 20.0).abs() < 1e-3);
        assert!((lines[0].length() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn crackle_overlap_pulls_start_back_along_previous_segment() {
        let mut rng = ScriptedRandom::new(vec![0.0, 0.0]);
        let params = CrackleParams::new(3, 0.0, 0.0).with_overlap(5.0);
        let lines = decompose_crackle(Vec2::ZERO, Vec2::new(90.0, 0.0), &params, &mut rng);
        // Zero jitter: segment 0 runs 0 -> 36, segment 1 starts 5px back at 31.
        assert!(close(lines[0].target, Vec2::new(36.0, 0.0)));
        assert!(close(lines[1].origin, Vec2::new(31.0, 0.0)));
        assert!(close(lines[1].target, Vec2::new(67.0, 0.0)));
        assert!(close(lines[2].origin, Vec2::new(62.0, 0.0)));
        assert_eq!(lines[2].target, Vec2::new(90.0, 0.0));
    }

    #[test]
    fn crackle_without_overlap_is_contiguous() {
        let mut rng = Rng::new(5);
        let lines = decompose_crackle(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 200.0),
            &CrackleParams::new(5, 15.0, 40.0),
            &mut rng,
        );
        for pair in lines.windows(2) {
            assert_eq!(pair[0].target, pair[1].origin);
        }
    }

    #[test]
    fn length_dir_and_rotation_agree() {
        let p = length_dir(Vec2::new(1.0, 1.0), 10.0, std::f32::consts::FRAC_PI_2);
        assert!(close(p, Vec2::new(1.0, 11.0)));
        assert!((rotation_to(Vec2::new(1.0, 1.0), p) - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
