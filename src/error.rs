// ============================================================================
// ERRORS
// ============================================================================

use std::path::PathBuf;

/// Failures of the demo host. The widget cores themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not a usable TrueType/OpenType font", path.display())]
    FontParse { path: PathBuf },

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),
}
