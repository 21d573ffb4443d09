//! Domain types shared by the engine and the pipeline stages.
//!
//! Templates and document references are inputs owned by the caller.
//! Payloads are what the stages decode from raw output. `Eval` and
//! `EvalItem` are the entities the eval stage hands back for persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored schema describing the shape of one stage's raw output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaTemplate {
    pub id: Uuid,

    /// Which stage this schema belongs to (e.g. "intents", "plan", "eval")
    pub schema_type: String,

    pub version: i32,

    /// JSON text of the schema body
    pub schema_body: String,
}

/// A stored prompt template and the model settings that go with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    pub id: Uuid,

    /// Lookup key (e.g. "intents.default")
    pub key: String,

    pub version: i32,

    /// Template text using `{{.path}}` substitutions
    pub template_text: String,

    /// Name of the model this prompt was written for
    #[serde(default)]
    pub model_name: String,

    /// Free-form model parameters, copied into artifacts untouched
    #[serde(default)]
    pub model_params: serde_json::Value,
}

/// The source material driving one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentReference {
    pub id: Uuid,

    pub subject_name: String,

    pub curriculum: String,

    /// Title shown to humans; used as the `title` input for every stage
    pub human_title: String,

    #[serde(default)]
    pub topic_tags: Vec<String>,

    /// Reviewer assigned to the document, copied onto artifacts
    #[serde(default)]
    pub reviewer_id: Option<Uuid>,

    pub requested_by: Uuid,

    pub requested_at: DateTime<Utc>,
}

/// One topic-level learning intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Intent {
    pub title: String,
    pub description: String,
}

/// Wire shape of the intent stage's raw output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentsPayload {
    pub intents: Vec<Intent>,
}

/// A study plan built from the intents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Plan {
    pub title: String,
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanStep {
    pub title: String,
    pub objectives: Vec<String>,
}

/// Wire shape of the eval stage's raw output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvalPayload {
    pub title: String,
    pub description: String,
    pub items: Vec<EvalItemPayload>,
}

/// One quiz question as produced by the synthesizer, before repair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvalItemPayload {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    pub hint: String,
    pub explanation: String,
}

/// Lifecycle of an evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvalStatus {
    Draft,
    Published,
    Archived,
}

/// An evaluation (quiz) created by the eval stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Eval {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: EvalStatus,

    /// The user who requested the generation run
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
}

/// A single question belonging to an `Eval`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalItem {
    pub id: Uuid,
    pub eval_id: Uuid,

    /// Zero-based position within the eval
    pub position: usize,

    pub prompt: String,

    /// Always at least two entries
    pub options: Vec<String>,

    /// Always a valid index into `options`
    pub correct_index: usize,

    pub hint: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}
