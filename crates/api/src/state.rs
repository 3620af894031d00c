use std::sync::Arc;

use trailview_core::lifecycle::PanoramaLifecycle;
use trailview_core::sequence::SequenceAssembler;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Panorama lifecycle orchestrator (store + image files).
    pub lifecycle: Arc<PanoramaLifecycle>,
    /// Sequence assembler over the same store.
    pub sequences: Arc<SequenceAssembler>,
    /// Server configuration (JWT secret, upload limits).
    pub config: Arc<ServerConfig>,
}
