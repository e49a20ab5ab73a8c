use std::sync::Arc;

use uuid::Uuid;

use super::assistant::{AssistantClient, AssistantContent};
use super::catalog::normalize_catalog;
use super::context::{build_extraction_context, IMAGE_TASK_INSTRUCTION, TEXT_TASK_INSTRUCTION};
use super::decoder::decode_order_lines;
use super::delimited::{looks_delimited, parse_delimited_order};
use super::memory::CorrectionMemory;
use super::ExtractionError;
use crate::models::{ExtractionSource, OrderLine, RawCatalogRow};

/// Raw order as submitted by the portal.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderInput {
    /// The semicolon-delimited export format.
    Delimited(String),
    /// Free-form order text.
    Text(String),
    /// A photographed order, base64-encoded.
    Image { media_type: String, data: String },
}

impl OrderInput {
    /// Classify pasted text: delimited when it contains an export record.
    pub fn from_text(text: &str) -> Self {
        if looks_delimited(text) {
            Self::Delimited(text.to_string())
        } else {
            Self::Text(text.to_string())
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Delimited(text) | Self::Text(text) => text.trim().is_empty(),
            Self::Image { data, .. } => data.trim().is_empty(),
        }
    }
}

/// Order lines plus how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub source: ExtractionSource,
    pub lines: Vec<OrderLine>,
}

/// Routes an order to the delimited parser or to the assistant:
/// delimited → parse; otherwise catalog + corrections → context → assistant → decode.
pub struct OrderExtractor {
    assistant: Option<Box<dyn AssistantClient + Send + Sync>>,
    memory: Arc<CorrectionMemory>,
}

impl OrderExtractor {
    pub fn new(
        assistant: Option<Box<dyn AssistantClient + Send + Sync>>,
        memory: Arc<CorrectionMemory>,
    ) -> Self {
        Self { assistant, memory }
    }

    pub fn memory(&self) -> &Arc<CorrectionMemory> {
        &self.memory
    }

    pub fn has_assistant(&self) -> bool {
        self.assistant.is_some()
    }

    pub fn extract(
        &self,
        input: &OrderInput,
        catalog: &[RawCatalogRow],
    ) -> Result<ExtractionOutcome, ExtractionError> {
        if input.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let request_id = Uuid::new_v4();

        let (content, instruction) = match input {
            OrderInput::Delimited(text) => {
                let order = parse_delimited_order(text)?;
                tracing::info!(
                    request_id = %request_id,
                    lines = order.lines.len(),
                    "Delimited order parsed"
                );
                return Ok(ExtractionOutcome {
                    source: ExtractionSource::Delimited,
                    lines: order.lines,
                });
            }
            OrderInput::Text(text) => (AssistantContent::Text(text.clone()), TEXT_TASK_INSTRUCTION),
            OrderInput::Image { media_type, data } => (
                AssistantContent::Image {
                    media_type: media_type.clone(),
                    data: data.clone(),
                },
                IMAGE_TASK_INSTRUCTION,
            ),
        };

        let assistant = self
            .assistant
            .as_ref()
            .ok_or(ExtractionError::AssistantNotConfigured)?;

        let entries = normalize_catalog(catalog);
        let corrections = self.memory.load();
        let context = build_extraction_context(&entries, &corrections);
        tracing::debug!(
            request_id = %request_id,
            catalog_entries = entries.len(),
            corrections = corrections.len(),
            context_chars = context.len(),
            "Extraction context built"
        );

        let reply = assistant.complete(&context, &content, instruction)?;

        let lines = decode_order_lines(&reply).map_err(|e| {
            tracing::warn!(request_id = %request_id, error = %e, "Assistant reply could not be decoded");
            e
        })?;

        tracing::info!(request_id = %request_id, lines = lines.len(), "Assistant order decoded");
        Ok(ExtractionOutcome {
            source: ExtractionSource::Assistant,
            lines,
        })
    }
}
