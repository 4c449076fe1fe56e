// ============================================================================
// GAUGE MODEL
// ============================================================================

use std::time::Duration;

use crate::notch::{AngularSpan, ValueRange};

pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(750);

/// Parameters for the host's needle animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    /// Where the rendered needle currently points.
    pub from: f64,
    /// Needle angle for the current value.
    pub to: f64,
    pub duration: Duration,
}

/// Value, bounds and angular span of a needle gauge.
///
/// `minimum` may be larger than `maximum`; the effective bounds are always
/// re-derived on demand through [`GaugeModel::real_range`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeModel {
    value: f64,
    minimum: f64,
    maximum: f64,
    label: String,
    animation_duration: Duration,
    span: AngularSpan,
}

impl Default for GaugeModel {
    fn default() -> Self {
        Self {
            value: 0.0,
            minimum: 0.0,
            maximum: 100.0,
            label: String::new(),
            animation_duration: DEFAULT_ANIMATION_DURATION,
            span: AngularSpan::DEFAULT,
        }
    }
}

impl GaugeModel {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            value: minimum,
            ..Self::default()
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn animation_duration(&self) -> Duration {
        self.animation_duration
    }

    pub fn span(&self) -> AngularSpan {
        self.span
    }

    /// Stores the value and returns the new needle angle.
    pub fn set_value(&mut self, value: f64) -> f64 {
        self.value = value;
        self.needle_angle()
    }

    pub fn set_minimum(&mut self, minimum: f64) -> f64 {
        self.minimum = minimum;
        self.needle_angle()
    }

    pub fn set_maximum(&mut self, maximum: f64) -> f64 {
        self.maximum = maximum;
        self.needle_angle()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.animation_duration = duration;
    }

    pub fn set_span(&mut self, span: AngularSpan) -> f64 {
        self.span = span;
        self.needle_angle()
    }

    pub fn real_minimum(&self) -> f64 {
        self.real_range().min
    }

    pub fn real_maximum(&self) -> f64 {
        self.real_range().max
    }

    pub fn real_range(&self) -> ValueRange {
        ValueRange::new(self.minimum, self.maximum)
    }

    /// The value clamped into the real range and scaled to `0.0..=1.0`.
    ///
    /// A zero (or non-finite) range width parks the needle at `0.0`, as does
    /// a NaN value.
    pub fn normalized_value(&self) -> f64 {
        let ValueRange { min, max } = self.real_range();
        let width = max - min;
        if width == 0.0 || !width.is_finite() || self.value.is_nan() {
            return 0.0;
        }

        let clamped = if self.value > max {
            max
        } else if self.value < min {
            min
        } else {
            self.value
        };
        (clamped - min) / width
    }

    pub fn needle_angle(&self) -> f64 {
        self.span.angle_at(self.normalized_value())
    }

    /// Animation from `current_angle` to the needle angle of the current
    /// value.
    pub fn animation_request(&self, current_angle: f64) -> AnimationRequest {
        AnimationRequest {
            from: current_angle,
            to: self.needle_angle(),
            duration: self.animation_duration,
        }
    }
}
