//! Trusted credential endpoint
//!
//! Keeps the upstream API key on the server side:
//! - POST /api/get-signed-url - `{signedUrl}` or `{directUse: true}`
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
