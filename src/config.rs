use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::gauge::DEFAULT_ANIMATION_DURATION;
use crate::notch::{NotchSource, DEFAULT_NOTCH_COUNT};

/// Color representation for widget elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Initial property values for a [`crate::Dial360`].
#[derive(Debug, Clone, Builder)]
pub struct Dial360Config {
    #[builder(default = 0.0)]
    pub value: f64,
    #[builder(default = 0.0)]
    pub minimum: f64,
    #[builder(default = 100.0)]
    pub maximum: f64,
    #[builder(default, into)]
    pub label: String,
    /// `None` generates `default_notch_count` evenly spaced notches.
    pub notches: Option<NotchSource>,
    #[builder(default = DEFAULT_NOTCH_COUNT)]
    pub default_notch_count: usize,
    #[builder(default = DEFAULT_ANIMATION_DURATION)]
    pub animation_duration: Duration,
}

impl Default for Dial360Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Initial property values for a [`crate::Swoop`].
#[derive(Debug, Clone, Builder)]
pub struct SwoopConfig {
    #[builder(default = -90.0)]
    pub start_angle: f64,
    #[builder(default = 90.0)]
    pub end_angle: f64,
    #[builder(default = 0.0)]
    pub start_thickness: f64,
    #[builder(default = 10.0)]
    pub end_thickness: f64,
    #[builder(default = 0.0)]
    pub width: f64,
    #[builder(default = 0.0)]
    pub height: f64,
}

impl Default for SwoopConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Appearance of the rendered dial.
#[derive(Debug, Clone, Builder)]
pub struct DialStyle {
    #[builder(default = 12)]
    pub margin: i32,
    #[builder(default = 3.0)]
    pub rim_thickness: f32,
    #[builder(default = 14.0)]
    pub tick_length: f64,
    #[builder(default = 2.0)]
    pub tick_thickness: f32,
    #[builder(default = 16.0)]
    pub notch_font_size: f32,
    #[builder(default = 16.0)]
    pub tick_to_label_distance: f64,
    #[builder(default = 22.0)]
    pub face_font_size: f32,
    #[builder(default = 0.85)]
    pub needle_length_factor: f64,
    #[builder(default = 4.0)]
    pub needle_width: f32,
    #[builder(default = 18.0)]
    pub needle_back_length: f64,
    #[builder(default = 6)]
    pub hub_radius: i32,
    #[builder(default = Color::new(0x00, 0x00, 0x00))]
    pub foreground: Color,
    #[builder(default = Color::new(0xd0, 0x10, 0x10))]
    pub needle_color: Color,
}

impl Default for DialStyle {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Settings for the demo window.
#[derive(Debug, Clone, Builder)]
pub struct DemoConfig {
    #[builder(default = "Dashboard".to_string(), into)]
    pub title: String,
    #[builder(default = 640)]
    pub window_width: usize,
    #[builder(default = 360)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    /// Interval between value updates.
    #[builder(default = Duration::from_millis(200))]
    pub tick_interval: Duration,
    /// Amount added to the value on every tick.
    #[builder(default = 2.15)]
    pub tick_step: f64,
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub background: Color,
    #[builder(default = Color::new(0xff, 0x00, 0x00))]
    pub swoop_color: Color,
    /// TrueType/OpenType font used for labels.
    pub font_path: Option<PathBuf>,
    #[builder(default)]
    pub style: DialStyle,
}

impl DemoConfig {
    pub const FONT_ENV: &'static str = "DASHBOARD_FONT";

    /// Defaults, with the font taken from `DASHBOARD_FONT` when set.
    pub fn from_env() -> Self {
        Self::builder()
            .maybe_font_path(std::env::var_os(Self::FONT_ENV).map(PathBuf::from))
            .build()
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
