//! HTTP surface for the order portal.
//!
//! `api_router()` returns a composable `Router`; `server::serve` binds it.
//! Pipeline and ERP calls are blocking and run on the blocking thread pool.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
