//! Animation playback state
//!
//! [`AnimationPlayer`] tracks elapsed time, pause and speed for one model
//! instance and drives timed cross-fades between clips using the blended
//! evaluator. The player holds clip indices only; the model is passed to
//! [`AnimationPlayer::pose`] so one model can back many players.

use glam::Mat4;

use crate::error::Result;
use crate::model::SkinnedModel;

/// An in-progress transition to another clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossFade {
    pub target: usize,
    /// Fade length in seconds
    pub duration: f64,
    pub elapsed: f64,
}

impl CrossFade {
    /// Blend factor, 0 at the start of the fade and 1 at its end
    pub fn factor(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0) as f32
    }
}

/// Playback state for one animated model instance
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: usize,
    /// Playback time in seconds
    time: f64,
    speed: f64,
    paused: bool,
    fade: Option<CrossFade>,
}

impl AnimationPlayer {
    /// Start playing `clip` from time zero
    pub fn new(clip: usize) -> Self {
        Self {
            clip,
            time: 0.0,
            speed: 1.0,
            paused: false,
            fade: None,
        }
    }

    /// Advance playback by `delta_seconds` of wall-clock time
    ///
    /// Does nothing while paused. The delta is scaled by the playback speed.
    pub fn update(&mut self, delta_seconds: f64) {
        if self.paused {
            return;
        }

        let delta = delta_seconds * self.speed;
        self.time += delta;

        if let Some(fade) = &mut self.fade {
            fade.elapsed += delta.abs();
            if fade.elapsed >= fade.duration {
                log::debug!("Cross-fade to clip {} finished", fade.target);
                self.clip = fade.target;
                self.fade = None;
            }
        }
    }

    /// Switch to `clip` immediately and restart from time zero
    pub fn play(&mut self, clip: usize) {
        self.clip = clip;
        self.time = 0.0;
        self.fade = None;
    }

    /// Blend from the current clip into `target` over `duration_seconds`
    ///
    /// Playback time is shared, so the target continues from the current
    /// time rather than restarting. A non-positive duration switches at once.
    ///
    /// When a fade is already running, a request for the same target keeps
    /// it. A different target starts a new fade from whichever clip has the
    /// larger weight in the running one.
    pub fn cross_fade(&mut self, target: usize, duration_seconds: f64) {
        if let Some(running) = self.fade.take() {
            if running.target == target {
                self.fade = Some(running);
                return;
            }
            if running.factor() >= 0.5 {
                self.clip = running.target;
            }
        }

        if target == self.clip {
            return;
        }

        if duration_seconds <= 0.0 {
            self.clip = target;
            return;
        }

        self.fade = Some(CrossFade {
            target,
            duration: duration_seconds,
            elapsed: 0.0,
        });
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Playback time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, seconds: f64) {
        self.time = seconds;
    }

    pub fn current_clip(&self) -> usize {
        self.clip
    }

    pub fn fade(&self) -> Option<&CrossFade> {
        self.fade.as_ref()
    }

    /// Weight of the fade target, 0 when no fade is active
    pub fn blend_factor(&self) -> f32 {
        self.fade.as_ref().map_or(0.0, CrossFade::factor)
    }

    /// Evaluate the current pose of `model` into `out`
    pub fn pose(&self, model: &SkinnedModel, out: &mut Vec<Mat4>) -> Result<()> {
        match &self.fade {
            Some(fade) => {
                model.bone_transforms_blended(self.time, self.clip, fade.target, fade.factor(), out)
            }
            None => model.bone_transforms(self.time, self.clip, out),
        }
    }
}
