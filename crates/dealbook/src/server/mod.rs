//! REST API for deals and listings
//!
//! Handlers share an `AppState` and answer with the `BaseResponse` envelope.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod state;
pub mod types;

pub use routing::create_router;
pub use startup::start_server;
pub use state::AppState;
