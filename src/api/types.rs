//! Shared state for the API layer.

use std::sync::Arc;

use crate::erp::OdooClient;
use crate::pipeline::{CorrectionMemory, OrderExtractor};

use super::error::ApiError;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub extractor: Arc<OrderExtractor>,
    /// `None` when no ERP is configured.
    pub erp: Option<Arc<OdooClient>>,
}

impl ApiContext {
    pub fn new(extractor: OrderExtractor, erp: Option<OdooClient>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            erp: erp.map(Arc::new),
        }
    }

    pub fn memory(&self) -> &Arc<CorrectionMemory> {
        self.extractor.memory()
    }

    pub fn erp(&self) -> Result<Arc<OdooClient>, ApiError> {
        self.erp.clone().ok_or(ApiError::ErpNotConfigured)
    }
}

/// Run blocking pipeline or ERP work off the async executor.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
