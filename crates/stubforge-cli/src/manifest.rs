//! Pipeline manifest: the document and the three stage templates.
//!
//! Ids and timestamps may be omitted; they are filled in at load time.
//! A schema `body` may be written inline as YAML/JSON structure or as a
//! string holding JSON text.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use stubforge_core::{
    DocumentReference, PipelineTemplates, PromptTemplate, SchemaTemplate, StageTemplates,
};

/// Read a YAML or JSON file, choosing the format by extension.
pub fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_structured(path, &contents).with_context(|| format!("parsing {}", path.display()))
}

fn parse_structured<T: DeserializeOwned>(path: &Path, contents: &str) -> Result<T> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(contents)?),
        _ => Ok(serde_yaml::from_str(contents)?),
    }
}

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub document: DocumentSpec,
    pub intents: StageSpec,
    pub plan: StageSpec,
    pub eval: StageSpec,
}

#[derive(Debug, Deserialize)]
pub struct DocumentSpec {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub curriculum: String,
    pub human_title: String,
    #[serde(default)]
    pub topic_tags: Vec<String>,
    pub reviewer_id: Option<Uuid>,
    pub requested_by: Option<Uuid>,
    pub requested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct StageSpec {
    pub prompt: PromptSpec,
    pub schema: SchemaSpec,
}

#[derive(Debug, Deserialize)]
pub struct PromptSpec {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_version")]
    pub version: i32,
    pub template_text: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub model_params: Value,
}

#[derive(Debug, Deserialize)]
pub struct SchemaSpec {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub schema_type: String,
    #[serde(default = "default_version")]
    pub version: i32,
    pub body: Value,
}

fn default_version() -> i32 {
    1
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        load_structured(path)
    }

    /// Resolve the document, stamping missing ids and `requested_at` with `now`.
    pub fn document(&self, now: DateTime<Utc>) -> DocumentReference {
        let doc = &self.document;
        DocumentReference {
            id: doc.id.unwrap_or_else(Uuid::new_v4),
            subject_name: doc.subject_name.clone(),
            curriculum: doc.curriculum.clone(),
            human_title: doc.human_title.clone(),
            topic_tags: doc.topic_tags.clone(),
            reviewer_id: doc.reviewer_id,
            requested_by: doc.requested_by.unwrap_or_else(Uuid::new_v4),
            requested_at: doc.requested_at.unwrap_or(now),
        }
    }

    pub fn templates(&self) -> Result<PipelineTemplates> {
        Ok(PipelineTemplates {
            intents: self.intents.resolve("intents")?,
            plan: self.plan.resolve("plan")?,
            eval: self.eval.resolve("eval")?,
        })
    }
}

impl StageSpec {
    fn resolve(&self, stage: &str) -> Result<StageTemplates> {
        let prompt = PromptTemplate {
            id: self.prompt.id.unwrap_or_else(Uuid::new_v4),
            key: or_stage(&self.prompt.key, stage),
            version: self.prompt.version,
            template_text: self.prompt.template_text.clone(),
            model_name: self.prompt.model_name.clone(),
            model_params: self.prompt.model_params.clone(),
        };

        let schema = SchemaTemplate {
            id: self.schema.id.unwrap_or_else(Uuid::new_v4),
            schema_type: or_stage(&self.schema.schema_type, stage),
            version: self.schema.version,
            schema_body: schema_body(&self.schema.body)
                .with_context(|| format!("encoding {stage} schema body"))?,
        };

        Ok(StageTemplates { prompt, schema })
    }
}

fn or_stage(value: &str, stage: &str) -> String {
    if value.is_empty() {
        stage.to_string()
    } else {
        value.to_string()
    }
}

/// JSON text for a schema body. Strings are taken as JSON text already.
pub fn schema_body(body: &Value) -> Result<String> {
    match body {
        Value::String(text) => Ok(text.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}
