//! Result extraction from a transaction's message log.
//!
//! Responders announce completion with a `COMPLETE` message, but two payload
//! conventions are in circulation:
//!
//! - a nested `workResult` object (`translatedText`, `targetLanguage`,
//!   `sourceLanguage`, `confidence`), as written by the ledger's completion call;
//! - a flat payload (`translation`, `targetLanguage`, `sourceLanguage`) posted
//!   as a plain message, which carries no confidence.
//!
//! Only the newest `COMPLETE` message is considered. If it is unusable the
//! transaction has no result, even when an older completion would have parsed.

use serde::Deserialize;
use serde_json::Value;

use super::TranslationResult;
use crate::ledger::models::Message;

/// Confidence recorded when the payload does not carry one
pub const DEFAULT_CONFIDENCE: f64 = 95.0;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkResultShape {
    work_result: WorkResultBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkResultBody {
    translated_text: String,
    target_language: String,
    source_language: String,
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineShape {
    translation: String,
    target_language: String,
    source_language: String,
}

/// A completion payload, classified once.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPayload {
    WorkResult(TranslationResult),
    Inline {
        translated_text: String,
        target_language: String,
        source_language: String,
    },
    Unrecognized,
}

impl CompletionPayload {
    /// Classify a payload. Every required field must be present and non-empty
    /// (confidence must be non-zero); the nested shape is tried first.
    pub fn classify(payload: Option<&Value>) -> Self {
        let Some(payload) = payload else {
            return CompletionPayload::Unrecognized;
        };

        if let Ok(shape) = WorkResultShape::deserialize(payload) {
            let body = shape.work_result;
            if all_present(&[&body.translated_text, &body.target_language, &body.source_language])
                && body.confidence != 0.0
                && !body.confidence.is_nan()
            {
                return CompletionPayload::WorkResult(TranslationResult {
                    translated_text: body.translated_text,
                    target_language: body.target_language,
                    source_language: body.source_language,
                    confidence: body.confidence,
                });
            }
        }

        if let Ok(shape) = InlineShape::deserialize(payload) {
            if all_present(&[&shape.translation, &shape.target_language, &shape.source_language]) {
                return CompletionPayload::Inline {
                    translated_text: shape.translation,
                    target_language: shape.target_language,
                    source_language: shape.source_language,
                };
            }
        }

        CompletionPayload::Unrecognized
    }

    pub fn into_result(self) -> Option<TranslationResult> {
        match self {
            CompletionPayload::WorkResult(result) => Some(result),
            CompletionPayload::Inline {
                translated_text,
                target_language,
                source_language,
            } => Some(TranslationResult {
                translated_text,
                target_language,
                source_language,
                confidence: DEFAULT_CONFIDENCE,
            }),
            CompletionPayload::Unrecognized => None,
        }
    }
}

fn all_present(fields: &[&String]) -> bool {
    fields.iter().all(|field| !field.is_empty())
}

/// Extract the canonical result from a message log (oldest first).
pub fn extract(messages: &[Message]) -> Option<TranslationResult> {
    messages
        .iter()
        .rev()
        .find(|message| message.is_completion())
        .and_then(|message| CompletionPayload::classify(message.payload.as_ref()).into_result())
}
