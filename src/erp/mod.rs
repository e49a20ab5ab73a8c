//! Odoo ERP collaborator: product catalog and customer directory.
//!
//! The pipeline never talks to the ERP itself. The HTTP layer fetches the
//! catalog here when a request does not carry its own snapshot.

pub mod odoo;
pub mod session;

pub use odoo::*;
pub use session::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErpError {
    #[error("ERP rejected the configured credentials")]
    AuthenticationFailed,

    #[error("ERP is not reachable at {0}")]
    Connection(String),

    #[error("ERP returned HTTP status {status}")]
    Http { status: u16 },

    #[error("ERP call failed: {0}")]
    Remote(String),

    #[error("Unexpected ERP response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
