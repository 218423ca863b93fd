//! Relevance extraction for context-injection mode.
//!
//! Routing here is lexical on purpose: the message is lower-cased once and
//! checked for substring hits against two independent keyword tables. The
//! broad domain gate decides whether a message is about hospital operations
//! at all; the per-category triggers on [`DataCategory`] decide which data
//! to fetch eagerly. The two lists diverge (gate-only words like "ward"
//! fetch nothing, category triggers like "doctor" do not open the gate) and
//! that divergence is part of the routing contract.

use std::sync::Arc;

use serde_json::Value;

use crate::hospital::{DataCategory, HospitalGateway};

/// Words that mark a message as hospital-related for mode selection.
const DOMAIN_KEYWORDS: &[&str] = &[
    "patient",
    "staff",
    "room",
    "bed",
    "alert",
    "vital",
    "device",
    "iot",
    "anomaly",
    "treatment",
    "schedule",
    "simulation",
    "ward",
    "critical",
    "monitor",
    "hospital",
];

/// Data bundle injected into a context-injection system prompt, keyed by
/// [`DataCategory::bundle_key`].
pub type ContextBundle = serde_json::Map<String, Value>;

/// Decides which hospital data a message needs and fetches it eagerly.
#[derive(Debug, Clone)]
pub struct RelevanceExtractor {
    gateway: Arc<HospitalGateway>,
}

impl RelevanceExtractor {
    /// Create an extractor fetching through the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<HospitalGateway>) -> Self {
        Self { gateway }
    }

    /// Whether the message mentions the hospital domain at all.
    #[must_use]
    pub fn is_domain_related(message: &str) -> bool {
        let lower = message.to_lowercase();
        DOMAIN_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }

    /// Categories whose keyword set intersects the message, in probe order.
    #[must_use]
    pub fn triggered_categories(message: &str) -> Vec<DataCategory> {
        let lower = message.to_lowercase();
        DataCategory::ALL
            .iter()
            .copied()
            .filter(|c| c.keywords().iter().any(|kw| lower.contains(kw)))
            .collect()
    }

    /// Fetch data for every category the message triggers.
    ///
    /// This never fails: a category whose fetch errors gets an `error`
    /// marker under its bundle key and extraction continues with the rest,
    /// so one sick upstream endpoint degrades the answer instead of killing
    /// the request.
    pub async fn extract(&self, message: &str) -> ContextBundle {
        let mut bundle = ContextBundle::new();
        for category in Self::triggered_categories(message) {
            match self.gateway.fetch_category(category).await {
                Ok(data) => {
                    bundle.insert(category.bundle_key().to_string(), data);
                }
                Err(e) => {
                    tracing::warn!(
                        category = category.slug(),
                        error = %e,
                        "context fetch failed, continuing with remaining categories"
                    );
                    bundle.insert(
                        category.bundle_key().to_string(),
                        serde_json::json!({"error": e.to_string()}),
                    );
                }
            }
        }
        tracing::debug!(categories = bundle.len(), "context bundle assembled");
        bundle
    }
}

// ============================================================================
// Tests
// ============================================================================
