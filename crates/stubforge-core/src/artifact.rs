//! Audit records for generation calls.
//!
//! Every stage produces exactly one `Artifact`. It records what was asked
//! for (prompt, schema, model settings, rendered prompt) next to what was
//! produced (the raw output, byte for byte), so reviewers can diff the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::engine::Generation;
use crate::types::{PromptTemplate, SchemaTemplate};

/// Which stage produced an artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    Intents,
    Plan,
    Eval,
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactType::Intents => "INTENTS",
            ArtifactType::Plan => "PLAN",
            ArtifactType::Eval => "EVAL",
        };
        f.write_str(name)
    }
}

/// Review state of an artifact. Stages always emit `PendingReview`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    PendingReview,
    Approved,
    Rejected,
}

/// Audit record of one generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,

    pub status: ArtifactStatus,

    pub reviewer_id: Option<Uuid>,

    /// Set only on `EVAL` artifacts
    pub eval_id: Option<Uuid>,

    /// The exact raw output the payload was decoded from
    pub output_raw: String,

    pub model: Option<String>,

    pub prompt_text: Option<String>,

    pub prompt_template_id: Option<Uuid>,

    pub schema_template_id: Option<Uuid>,

    pub model_params: serde_json::Value,

    /// `None` when the prompt template failed to render
    pub prompt_render: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Parse the raw output back into a JSON value.
    pub fn output_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.output_raw)
    }
}

/// Builder for creating artifacts with fluent API.
pub struct ArtifactBuilder {
    artifact: Artifact,
}

impl ArtifactBuilder {
    /// Start an artifact for the output of `generation`.
    pub fn new(
        artifact_type: ArtifactType,
        generation: &Generation,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            artifact: Artifact {
                id: Uuid::new_v4(),
                artifact_type,
                status: ArtifactStatus::PendingReview,
                reviewer_id: None,
                eval_id: None,
                output_raw: String::from_utf8_lossy(&generation.raw).into_owned(),
                model: None,
                prompt_text: None,
                prompt_template_id: None,
                schema_template_id: None,
                model_params: serde_json::Value::Null,
                prompt_render: generation.prompt_render.clone(),
                created_at,
            },
        }
    }

    /// Record the prompt template and its model settings.
    pub fn prompt(mut self, prompt: &PromptTemplate) -> Self {
        self.artifact.model = Some(prompt.model_name.clone()).filter(|m| !m.is_empty());
        self.artifact.prompt_text = Some(prompt.template_text.clone());
        self.artifact.prompt_template_id = Some(prompt.id);
        self.artifact.model_params = prompt.model_params.clone();
        self
    }

    /// Record the schema template.
    pub fn schema(mut self, schema: &SchemaTemplate) -> Self {
        self.artifact.schema_template_id = Some(schema.id);
        self
    }

    pub fn reviewer(mut self, reviewer_id: Option<Uuid>) -> Self {
        self.artifact.reviewer_id = reviewer_id;
        self
    }

    /// Link the artifact to the eval it produced.
    pub fn eval(mut self, eval_id: Uuid) -> Self {
        self.artifact.eval_id = Some(eval_id);
        self
    }

    /// Build the artifact.
    pub fn build(self) -> Artifact {
        self.artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generation() -> Generation {
        Generation {
            raw: br#"{"title":"x"}"#.to_vec(),
            prompt_render: Some("rendered".to_string()),
        }
    }

    #[test]
    fn test_builder_captures_prompt_and_schema() {
        let prompt = PromptTemplate {
            id: Uuid::new_v4(),
            key: "plan.default".to_string(),
            version: 2,
            template_text: "Plan {{.title}}".to_string(),
            model_name: "offline".to_string(),
            model_params: json!({ "temperature": 0 }),
        };
        let schema = SchemaTemplate {
            id: Uuid::new_v4(),
            schema_type: "plan".to_string(),
            version: 1,
            schema_body: "{}".to_string(),
        };
        let reviewer = Uuid::new_v4();

        let artifact = ArtifactBuilder::new(ArtifactType::Plan, &generation(), Utc::now())
            .prompt(&prompt)
            .schema(&schema)
            .reviewer(Some(reviewer))
            .build();

        assert_eq!(artifact.artifact_type, ArtifactType::Plan);
        assert_eq!(artifact.status, ArtifactStatus::PendingReview);
        assert_eq!(artifact.output_raw, r#"{"title":"x"}"#);
        assert_eq!(artifact.model.as_deref(), Some("offline"));
        assert_eq!(artifact.prompt_text.as_deref(), Some("Plan {{.title}}"));
        assert_eq!(artifact.prompt_template_id, Some(prompt.id));
        assert_eq!(artifact.schema_template_id, Some(schema.id));
        assert_eq!(artifact.model_params, json!({ "temperature": 0 }));
        assert_eq!(artifact.prompt_render.as_deref(), Some("rendered"));
        assert_eq!(artifact.reviewer_id, Some(reviewer));
        assert_eq!(artifact.eval_id, None);
        assert_eq!(artifact.output_value().unwrap(), json!({ "title": "x" }));
    }

    #[test]
    fn test_wire_names() {
        let artifact = ArtifactBuilder::new(ArtifactType::Intents, &generation(), Utc::now()).build();
        let value = serde_json::to_value(&artifact).unwrap();
        assert_eq!(value["type"], json!("INTENTS"));
        assert_eq!(value["status"], json!("pending_review"));
        assert_eq!(ArtifactType::Eval.to_string(), "EVAL");
    }
}
