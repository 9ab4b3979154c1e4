//! Animation clips and clip-local time mapping

use std::collections::HashMap;

use crate::track::NodeAnimation;

/// Tick rate assumed for clips that do not declare one
pub const DEFAULT_TICKS_PER_SECOND: f64 = 25.0;

/// One named animation: per-node channels plus duration and tick rate
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    /// Declared duration in ticks
    duration: f64,
    /// Declared tick rate (0 = unspecified)
    ticks_per_second: f64,
    channels: Vec<NodeAnimation>,
    /// Node name -> index into `channels`
    lookup: HashMap<String, usize>,
}

impl AnimationClip {
    /// Create a clip
    ///
    /// If more than one channel targets the same node, the first one wins.
    pub fn new(
        name: impl Into<String>,
        duration: f64,
        ticks_per_second: f64,
        channels: Vec<NodeAnimation>,
    ) -> Self {
        let name = name.into();
        let mut lookup = HashMap::with_capacity(channels.len());

        for (index, channel) in channels.iter().enumerate() {
            if lookup.contains_key(channel.node_name()) {
                log::warn!(
                    "Clip '{}' has more than one channel for node '{}', keeping the first",
                    name,
                    channel.node_name()
                );
                continue;
            }
            lookup.insert(channel.node_name().to_string(), index);
        }

        Self {
            name,
            duration,
            ticks_per_second,
            channels,
            lookup,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared duration in ticks, including any fractional part
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Declared tick rate, which may be zero
    pub fn declared_ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    /// Effective tick rate: the declared rate, or 25 when none is declared
    pub fn ticks_per_second(&self) -> f64 {
        if self.ticks_per_second != 0.0 {
            self.ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        }
    }

    /// Loop period in ticks: only the integral part of the duration is used
    pub fn loop_duration(&self) -> f64 {
        self.duration.trunc()
    }

    /// Loop period in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.loop_duration() / self.ticks_per_second()
    }

    /// Map a time in seconds to clip ticks, looping over the clip
    ///
    /// The result is always in `[0, loop_duration)`. Clips whose loop
    /// duration truncates to zero always map to tick 0.
    pub fn animation_time_ticks(&self, time_in_seconds: f64) -> f64 {
        let duration = self.loop_duration();
        if duration <= 0.0 {
            return 0.0;
        }

        let time_in_ticks = time_in_seconds * self.ticks_per_second();
        let ticks = time_in_ticks.rem_euclid(duration);

        // rem_euclid can round up to the divisor for tiny negative inputs
        if ticks >= duration { 0.0 } else { ticks }
    }

    pub fn channels(&self) -> &[NodeAnimation] {
        &self.channels
    }

    /// Channel animating `node_name`, if any
    pub fn channel(&self, node_name: &str) -> Option<&NodeAnimation> {
        self.lookup.get(node_name).map(|&i| &self.channels[i])
    }

    /// Number of distinct animated nodes
    pub fn animated_node_count(&self) -> usize {
        self.lookup.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(duration: f64, ticks_per_second: f64) -> AnimationClip {
        AnimationClip::new("test", duration, ticks_per_second, Vec::new())
    }

    #[test]
    fn test_default_tick_rate() {
        assert_eq!(clip(10.0, 0.0).ticks_per_second(), 25.0);
        assert_eq!(clip(10.0, 30.0).ticks_per_second(), 30.0);
    }

    #[test]
    fn test_duration_is_truncated() {
        let clip = clip(10.75, 1.0);
        assert_eq!(clip.loop_duration(), 10.0);
        assert!((clip.animation_time_ticks(10.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_time_mapping_loops() {
        let clip = clip(50.0, 25.0);

        assert!((clip.animation_time_ticks(0.0) - 0.0).abs() < 1e-9);
        assert!((clip.animation_time_ticks(1.0) - 25.0).abs() < 1e-9);
        assert!((clip.animation_time_ticks(2.5) - 12.5).abs() < 1e-9);
        assert!((clip.animation_time_ticks(4.5) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_time_wraps_into_range() {
        let clip = clip(10.0, 1.0);
        let ticks = clip.animation_time_ticks(-2.5);
        assert!((ticks - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_clip_maps_to_start() {
        assert_eq!(clip(0.5, 1.0).animation_time_ticks(3.0), 0.0);
    }

    #[test]
    fn test_channel_lookup_keeps_first() {
        let clip = AnimationClip::new(
            "dup",
            10.0,
            1.0,
            vec![
                NodeAnimation::new("Arm"),
                NodeAnimation::new("Leg"),
                NodeAnimation::new("Arm"),
            ],
        );

        assert_eq!(clip.animated_node_count(), 2);
        assert!(clip.channel("Arm").is_some());
        assert!(clip.channel("Head").is_none());
    }
}
