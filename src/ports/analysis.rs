//! # Analysis Port
//!
//! The arrangement can be handed to a remote analysis service either as the
//! serialized entity list (with a plain-language description and the analyst
//! prompt built from it) or as a rendered snapshot. The service answers with
//! free text; the core only cleans reasoning traces out of it.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::entity::Entity;

/// Analysis service failures, all recoverable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("analysis service unavailable: {0}")]
    Unavailable(String),

    #[error("analysis request failed: {0}")]
    Request(String),

    #[error("unexpected analysis response: {0}")]
    Response(String),
}

/// What gets submitted for analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    /// The full entity list plus its description and prompt
    Arrangement {
        entities: Vec<Entity>,
        description: String,
        prompt: String,
    },
    /// A rendered picture of the canvas as a `data:` URL
    Snapshot { image: String },
}

impl Payload {
    /// Build the arrangement payload for `entities`
    pub fn arrangement(entities: &[Entity]) -> Self {
        let description = describe(entities);
        let prompt = build_prompt(&description);
        Payload::Arrangement {
            entities: entities.to_vec(),
            description,
            prompt,
        }
    }
}

/// Remote analysis service
pub trait AnalysisGateway {
    /// Submit `payload` and return the raw response text
    fn analyze(&self, payload: &Payload) -> Result<String, GatewayError>;
}

/// Result handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisOutcome {
    /// Submit `payload` through `gateway`, never failing
    pub fn request<G: AnalysisGateway + ?Sized>(gateway: &G, payload: &Payload) -> Self {
        match gateway.analyze(payload) {
            Ok(text) => {
                info!(chars = text.len(), "analysis received");
                Self {
                    success: true,
                    analysis: Some(strip_reasoning(&text)),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "analysis failed");
                Self {
                    success: false,
                    analysis: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// One clause per entity: role, name, gender, shape, living or deceased,
/// position, facing and size
pub fn describe(entities: &[Entity]) -> String {
    if entities.is_empty() {
        return "No family members.".to_string();
    }

    let clauses: Vec<String> = entities
        .iter()
        .map(|e| {
            let size = e.size();
            format!(
                "{} ({}, {}, {}, {}) at ({}, {}), facing {}, size {}x{}",
                e.role(),
                e.name(),
                e.effective_gender().name(),
                e.shape().name(),
                if e.is_deceased() { "deceased" } else { "living" },
                e.position().x,
                e.position().y,
                e.facing(),
                size.width,
                size.height
            )
        })
        .collect();

    format!("{}.", clauses.join("; "))
}

/// Wrap a description in the family-constellation analyst prompt
pub fn build_prompt(description: &str) -> String {
    format!(
        r#"# Family constellation analysis

You are a family-systems constellation analyst. The user has arranged the
members of their family on a canvas. Read the arrangement and describe what it
suggests about the user's inner state and family dynamics.

## How to read the arrangement
- Distance: closeness suggests bonding or, when extreme, blurred boundaries;
  large distances suggest estrangement or unresolved conflict.
- Facing: members facing each other suggest openness; facing away suggests
  avoidance or an unresolved issue.
- Placement: who stands at the center, who is behind whom (support), and who
  is pushed to a corner.
- Size and the deceased marker carry weight of their own.

## Output
Write the interpretation directly as warm, non-judgemental prose. Avoid
diagnoses and absolute statements, acknowledge the limits of the reading and
close with constructive suggestions.

Arrangement: {description}"#
    )
}

/// Remove `<think>…</think>` reasoning blocks and tidy blank lines.
///
/// Falls back to the original text if nothing would be left.
pub fn strip_reasoning(text: &str) -> String {
    let mut kept = String::with_capacity(text.len());
    let lower = text.to_ascii_lowercase();
    let mut cursor = 0;
    while let Some(start) = lower[cursor..].find("<think>").map(|i| cursor + i) {
        kept.push_str(&text[cursor..start]);
        cursor = match lower[start..].find("</think>") {
            Some(end) => start + end + "</think>".len(),
            None => text.len(),
        };
    }
    kept.push_str(&text[cursor..]);

    let mut lines: Vec<&str> = Vec::new();
    for line in kept.lines() {
        let blank = line.trim().is_empty();
        if blank && lines.last().map_or(true, |l| l.trim().is_empty()) {
            continue;
        }
        lines.push(line.trim_end());
    }
    let cleaned = lines.join("\n");
    let cleaned = cleaned
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '-' | '_'))
        .trim();

    if cleaned.is_empty() {
        text.to_string()
    } else {
        cleaned.to_string()
    }
}
