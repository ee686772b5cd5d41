//! HTTP presentation surface
//!
//! Exposes the voice session to renderers that live outside the process:
//! - GET /state - Current status and result
//! - POST /toggle - Start or stop listening
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, ToggleResponse};
pub use routes::create_router;
pub use state::AppState;
