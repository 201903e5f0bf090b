pub mod engine;
pub mod fixtures;
pub mod surface;

pub use engine::{EngineCall, ScriptedEngine};
pub use surface::{RecordingSurface, SurfaceOp};

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("nvgrid=debug,nvgrid_redraw=trace")),
            )
            .with_test_writer()
            .init();
    });
}
