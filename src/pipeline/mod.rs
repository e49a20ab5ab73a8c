pub mod assistant;
pub mod catalog;
pub mod context;
pub mod decoder;
pub mod delimited;
pub mod memory;
pub mod orchestrator;

pub use assistant::*;
pub use catalog::*;
pub use context::*;
pub use decoder::*;
pub use delimited::*;
pub use memory::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Input does not match the delimited export format: no CANT./COD. TN records found")]
    FormatMismatch,

    #[error("Order input is empty")]
    EmptyInput,

    #[error("Assistant reply could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    #[error("Assistant call failed: {0}")]
    Assistant(#[from] AssistantError),

    #[error("No assistant is configured for free-text or image orders")]
    AssistantNotConfigured,
}
