/// Easing curve for cell translation transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    SmoothStep,
    EaseInOutCubic,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
        }
    }
}

/// How hosts should animate a cell whose offset changed between two renders.
///
/// An animating cell may replace the hint; it returns to [`TransitionHint::DEFAULT`] once the
/// animation ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionHint {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl TransitionHint {
    pub const DEFAULT: TransitionHint = TransitionHint {
        duration_ms: 150,
        easing: Easing::Linear,
    };

    pub fn new(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }

    /// Eased progress in `[0, 1]` after `elapsed_ms`.
    pub fn progress(&self, elapsed_ms: u64) -> f32 {
        let duration = self.duration_ms.max(1);
        let t = (elapsed_ms as f32 / duration as f32).clamp(0.0, 1.0);
        self.easing.sample(t)
    }

    /// Interpolates an offset from `from` to `to` after `elapsed_ms`.
    pub fn interpolate(&self, from: f64, to: f64, elapsed_ms: u64) -> f64 {
        from + (to - from) * self.progress(elapsed_ms) as f64
    }
}

impl Default for TransitionHint {
    fn default() -> Self {
        Self::DEFAULT
    }
}
