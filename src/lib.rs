pub mod api;
pub mod config;
pub mod erp;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::Settings;
use crate::erp::{ErpError, OdooClient, OdooSession};
use crate::pipeline::{
    AnthropicClient, AssistantClient, AssistantError, CorrectionMemory, OrderExtractor,
};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Assistant client error: {0}")]
    Assistant(#[from] AssistantError),

    #[error("ERP client error: {0}")]
    Erp(#[from] ErpError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the order intake service and block until it shuts down.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::SERVICE_NAME, config::APP_VERSION);

    let settings = Settings::from_env()?;
    let ctx = build_context(&settings)?;

    // Blocking HTTP clients must be dropped outside the async runtime,
    // so `ctx` outlives it.
    let app = api::api_router(ctx.clone());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(settings.bind, app))?;
    drop(runtime);
    drop(ctx);
    Ok(())
}

fn build_context(settings: &Settings) -> Result<ApiContext, StartupError> {
    let memory = Arc::new(CorrectionMemory::open(settings.corrections_path()));

    let assistant: Option<Box<dyn AssistantClient + Send + Sync>> = match &settings.assistant {
        Some(a) => {
            let client = AnthropicClient::new(
                &a.url,
                &a.api_key,
                &a.model,
                config::ASSISTANT_TIMEOUT_SECS,
            )?;
            tracing::info!(model = client.model(), "Extraction assistant configured");
            Some(Box::new(client))
        }
        None => {
            tracing::warn!("ASSISTANT_API_KEY not set; only delimited orders can be extracted");
            None
        }
    };

    let erp = match &settings.odoo {
        Some(odoo) => {
            tracing::info!(url = %odoo.url, database = %odoo.database, "ERP configured");
            Some(OdooClient::new(
                odoo.clone(),
                OdooSession::default(),
                config::ERP_TIMEOUT_SECS,
            )?)
        }
        None => {
            tracing::warn!("ODOO_* variables incomplete; catalog and customer endpoints disabled");
            None
        }
    };

    Ok(ApiContext::new(OrderExtractor::new(assistant, memory), erp))
}
