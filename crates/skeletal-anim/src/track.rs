//! Keyframe tracks and per-node channel sampling
//!
//! A [`KeyframeTrack`] is an ordered list of `(time, value)` samples in clip
//! ticks. Sampling finds the bracketing pair of keys and interpolates
//! between them: linearly for vectors, spherically for rotations.

use glam::{Mat4, Quat, Vec3};

use crate::error::{AnimError, Result};

/// Trait for values that can be interpolated between two keyframes
pub trait Interpolate: Copy {
    /// Interpolate from `self` towards `other` by `factor` in `[0, 1]`
    fn interpolate(&self, other: &Self, factor: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(&self, other: &Self, factor: f32) -> Self {
        *self + (*other - *self) * factor
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, factor: f32) -> Self {
        // Renormalize to keep drift out of the rotation matrix
        self.slerp(*other, factor).normalize()
    }
}

/// A single sample of a track
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    /// Time in clip ticks
    pub time: f64,
    /// Value at that time
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Ordered, non-empty sequence of keyframes for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T> KeyframeTrack<T> {
    /// Create a track, validating that it is non-empty and that key times
    /// are finite and non-decreasing
    pub fn new(keys: Vec<Keyframe<T>>) -> Result<Self> {
        if keys.is_empty() {
            return Err(AnimError::InvalidTrack(
                "track has no keyframes".to_string(),
            ));
        }

        if let Some(key) = keys.iter().position(|k| !k.time.is_finite()) {
            return Err(AnimError::InvalidTrack(format!(
                "key {key} has a non-finite time"
            )));
        }

        if let Some(i) = keys.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(AnimError::InvalidTrack(format!(
                "key {} at time {} precedes key {} at time {}",
                i + 1,
                keys[i + 1].time,
                i,
                keys[i].time
            )));
        }

        Ok(Self { keys })
    }

    /// Create a single-key track holding `value` for all times
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; tracks are never empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time of the last key
    pub fn end_time(&self) -> f64 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Find the bracketing key pair for `time`
    ///
    /// Returns the index `i` with `time[i] <= time < time[i + 1]`, or `None`
    /// when `time` lies before the first key, at or after the last key, or
    /// the track has a single key.
    pub fn find_bracket(&self, time: f64) -> Option<usize> {
        self.keys
            .windows(2)
            .position(|w| w[0].time <= time && time < w[1].time)
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Sample the track at `time` (in ticks)
    ///
    /// A single-key track returns that key for every time. Times before the
    /// first key return the first key and times at or past the last key
    /// return the last key; nothing is extrapolated.
    pub fn sample(&self, time: f64) -> T {
        let first = &self.keys[0];
        if self.keys.len() == 1 {
            return first.value;
        }

        match self.find_bracket(time) {
            Some(i) => {
                let start = &self.keys[i];
                let end = &self.keys[i + 1];
                let factor = ((time - start.time) / (end.time - start.time)).clamp(0.0, 1.0);
                start.value.interpolate(&end.value, factor as f32)
            }
            None if time < first.time => first.value,
            None => self.keys[self.keys.len() - 1].value,
        }
    }
}

/// Decomposed local transform of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Decompose an affine matrix into scale, rotation and translation
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose `Translation * Rotation * Scale`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Blend towards `other`: `(1 - f) * a + f * b` for translation and
    /// scale, slerp for rotation. `factor` is not clamped.
    pub fn blend(&self, other: &Self, factor: f32) -> Self {
        Self {
            translation: self.translation * (1.0 - factor) + other.translation * factor,
            rotation: self.rotation.interpolate(&other.rotation, factor),
            scale: self.scale * (1.0 - factor) + other.scale * factor,
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Keyframe channels of one node within one clip
///
/// Any channel may be absent; sampling then falls back to the matching
/// component of the node's rest transform.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAnimation {
    node_name: String,
    positions: Option<KeyframeTrack<Vec3>>,
    rotations: Option<KeyframeTrack<Quat>>,
    scales: Option<KeyframeTrack<Vec3>>,
}

impl NodeAnimation {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            positions: None,
            rotations: None,
            scales: None,
        }
    }

    pub fn with_positions(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.positions = Some(track);
        self
    }

    pub fn with_rotations(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotations = Some(track);
        self
    }

    pub fn with_scales(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scales = Some(track);
        self
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn positions(&self) -> Option<&KeyframeTrack<Vec3>> {
        self.positions.as_ref()
    }

    pub fn rotations(&self) -> Option<&KeyframeTrack<Quat>> {
        self.rotations.as_ref()
    }

    pub fn scales(&self) -> Option<&KeyframeTrack<Vec3>> {
        self.scales.as_ref()
    }

    /// Time of the latest key across all channels
    pub fn end_time(&self) -> f64 {
        let positions = self.positions.as_ref().map_or(0.0, KeyframeTrack::end_time);
        let rotations = self.rotations.as_ref().map_or(0.0, KeyframeTrack::end_time);
        let scales = self.scales.as_ref().map_or(0.0, KeyframeTrack::end_time);
        positions.max(rotations).max(scales)
    }

    /// Sample all channels at `time` (in ticks)
    pub fn sample(&self, time: f64, rest: &LocalTransform) -> LocalTransform {
        LocalTransform {
            translation: self
                .positions
                .as_ref()
                .map_or(rest.translation, |track| track.sample(time)),
            rotation: self
                .rotations
                .as_ref()
                .map_or(rest.rotation, |track| track.sample(time)),
            scale: self
                .scales
                .as_ref()
                .map_or(rest.scale, |track| track.sample(time)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_track(keys: &[(f64, f32)]) -> KeyframeTrack<Vec3> {
        KeyframeTrack::new(
            keys.iter()
                .map(|&(t, x)| Keyframe::new(t, Vec3::new(x, 0.0, 0.0)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_track_rejected() {
        let result = KeyframeTrack::<Vec3>::new(Vec::new());
        assert!(matches!(result, Err(AnimError::InvalidTrack(_))));
    }

    #[test]
    fn test_decreasing_times_rejected() {
        let result = KeyframeTrack::new(vec![
            Keyframe::new(1.0, Vec3::ZERO),
            Keyframe::new(0.5, Vec3::ONE),
        ]);
        assert!(matches!(result, Err(AnimError::InvalidTrack(_))));
    }

    #[test]
    fn test_find_bracket() {
        let track = position_track(&[(0.0, 0.0), (10.0, 1.0), (20.0, 2.0), (30.0, 3.0)]);

        assert_eq!(track.find_bracket(0.0), Some(0));
        assert_eq!(track.find_bracket(5.0), Some(0));
        assert_eq!(track.find_bracket(10.0), Some(1));
        assert_eq!(track.find_bracket(29.9), Some(2));
        assert_eq!(track.find_bracket(30.0), None);
        assert_eq!(track.find_bracket(-1.0), None);
    }

    #[test]
    fn test_find_bracket_skips_duplicate_times() {
        let track = position_track(&[(0.0, 0.0), (10.0, 1.0), (10.0, 5.0), (20.0, 2.0)]);
        assert_eq!(track.find_bracket(10.0), Some(2));
        assert_eq!(track.find_bracket(9.0), Some(0));
    }

    #[test]
    fn test_sample_linear() {
        let track = position_track(&[(0.0, 0.0), (2.0, 10.0)]);

        assert!((track.sample(0.0).x - 0.0).abs() < 0.001);
        assert!((track.sample(1.0).x - 5.0).abs() < 0.001);
        assert!((track.sample(2.0 - 1e-6).x - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_out_of_range_clamps_to_end_keys() {
        let track = position_track(&[(1.0, 1.0), (2.0, 2.0)]);

        assert_eq!(track.sample(0.0).x, 1.0);
        assert_eq!(track.sample(2.0).x, 2.0);
        assert_eq!(track.sample(100.0).x, 2.0);
    }

    #[test]
    fn test_sample_single_key() {
        let track = position_track(&[(5.0, 7.0)]);
        assert_eq!(track.sample(-100.0).x, 7.0);
        assert_eq!(track.sample(5.0).x, 7.0);
        assert_eq!(track.sample(1e9).x, 7.0);
    }

    #[test]
    fn test_sample_rotation_is_normalized() {
        let track = KeyframeTrack::new(vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(1.0, Quat::from_rotation_y(std::f32::consts::PI)),
        ])
        .unwrap();

        let q = track.sample(0.5);
        assert!((q.length() - 1.0).abs() < 1e-5);

        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(q.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn test_missing_channels_use_rest_transform() {
        let rest = LocalTransform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_x(0.5),
            scale: Vec3::splat(2.0),
        };

        let anim = NodeAnimation::new("Arm").with_positions(position_track(&[(0.0, 4.0)]));
        let sampled = anim.sample(3.0, &rest);

        assert_eq!(sampled.translation, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(sampled.rotation, rest.rotation);
        assert_eq!(sampled.scale, rest.scale);
    }

    #[test]
    fn test_local_transform_roundtrip_matrix() {
        let local = LocalTransform {
            translation: Vec3::new(1.0, -2.0, 0.5),
            rotation: Quat::from_rotation_z(1.0),
            scale: Vec3::new(1.0, 2.0, 3.0),
        };

        let decomposed = LocalTransform::from_matrix(&local.to_matrix());
        assert!(decomposed.translation.abs_diff_eq(local.translation, 1e-5));
        assert!(decomposed.scale.abs_diff_eq(local.scale, 1e-5));
        assert!(decomposed.rotation.dot(local.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_blend_endpoints() {
        let a = LocalTransform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        };
        let b = LocalTransform {
            translation: Vec3::new(3.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(1.0),
            scale: Vec3::splat(3.0),
        };

        let mid = a.blend(&b, 0.5);
        assert!((mid.translation.x - 2.0).abs() < 1e-6);
        assert!((mid.scale.y - 2.0).abs() < 1e-6);
        assert!(mid.rotation.dot(Quat::from_rotation_y(0.5)).abs() > 0.9999);

        assert_eq!(a.blend(&b, 0.0).translation, a.translation);
        assert_eq!(a.blend(&b, 1.0).translation, b.translation);
    }
}
