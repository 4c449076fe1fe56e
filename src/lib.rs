// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================
//
// Dial360 and Swoop gauge widgets, independent of any UI toolkit.
//
// The widget cores compute what to draw and where the needle should go; the
// host supplies the window, the animation playback and the renderer. The
// `render` module and the demo binary are one such host.

pub mod config;
pub mod dial;
pub mod error;
pub mod gauge;
pub mod geometry;
pub mod notch;
pub mod observe;
pub mod render;
pub mod swoop;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use config::{Color, DemoConfig, Dial360Config, DialStyle, SwoopConfig};
pub use dial::{Dial360, DialEvent, DialProperty};
pub use error::DashboardError;
pub use gauge::{AnimationRequest, GaugeModel};
pub use geometry::{
    compass_radians, degrees_to_radians, plot_annulus_band, point_on_arc, AnnulusBand, Point,
};
pub use notch::{
    format_label, AngularSpan, CollectionChange, Notch, NotchCollection, NotchController,
    NotchLayout, NotchSource, ValueRange,
};
pub use observe::{Listeners, Subscription};
pub use swoop::{Swoop, SwoopEvent, SwoopParams, SwoopProperty};
