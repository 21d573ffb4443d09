//! Pipeline stages: intents, then plan, then eval.
//!
//! Each stage renders its inputs into the prompt, synthesizes raw output
//! against its schema, decodes that output into a typed payload and emits
//! one `Artifact`. Stages keep no state between calls; the caller threads
//! each stage's payload into the next.
//!
//! Repair policy:
//! - list-shaped optional content (the intent list, eval options, the
//!   correct index) is repaired in place and never surfaces as an error
//! - a missing plan or eval title is a hard stop

mod eval;
mod intent;
mod plan;

pub use eval::{generate_eval, normalize_item};
pub use intent::generate_intents;
pub use plan::generate_plan;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::artifact::{ArtifactBuilder, ArtifactType};
use crate::engine::{Generation, GenerationEngine, GenerationError};
use crate::template::Inputs;
use crate::types::{DocumentReference, PromptTemplate, SchemaTemplate};

/// Errors from a pipeline stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Failed to encode {stage} inputs: {source}")]
    InputEncode {
        stage: ArtifactType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {stage} payload: {source}")]
    PayloadDecode {
        stage: ArtifactType,
        #[source]
        source: serde_json::Error,
    },

    #[error("Generated plan has no title")]
    PlanTitleRequired,

    #[error("Generated eval has no title")]
    EvalTitleRequired,
}

/// Inputs shared by every stage: `{title: document.human_title}`.
fn document_inputs(document: &DocumentReference) -> Inputs {
    let mut inputs = Inputs::new();
    inputs.insert(
        "title".to_string(),
        Value::String(document.human_title.clone()),
    );
    inputs
}

/// Add a prior stage's payload to `inputs` under `key`.
fn insert_input<T: Serialize>(
    inputs: &mut Inputs,
    stage: ArtifactType,
    key: &str,
    value: &T,
) -> Result<(), StageError> {
    let value =
        serde_json::to_value(value).map_err(|source| StageError::InputEncode { stage, source })?;
    inputs.insert(key.to_string(), value);
    Ok(())
}

fn execute(
    engine: &GenerationEngine,
    stage: ArtifactType,
    document: &DocumentReference,
    prompt: &PromptTemplate,
    schema: &SchemaTemplate,
    inputs: &Inputs,
) -> Result<Generation, StageError> {
    tracing::debug!(
        stage = %stage,
        document_id = %document.id,
        prompt_key = %prompt.key,
        "Running stage"
    );
    Ok(engine.generate_with_render(prompt, schema, inputs)?)
}

/// Start the artifact for a stage run. Every stage records the same fields.
fn artifact_builder(
    stage: ArtifactType,
    document: &DocumentReference,
    prompt: &PromptTemplate,
    schema: &SchemaTemplate,
    generation: &Generation,
    created_at: DateTime<Utc>,
) -> ArtifactBuilder {
    ArtifactBuilder::new(stage, generation, created_at)
        .prompt(prompt)
        .schema(schema)
        .reviewer(document.reviewer_id)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::types::{DocumentReference, PromptTemplate, SchemaTemplate};

    pub fn document() -> DocumentReference {
        DocumentReference {
            id: Uuid::new_v4(),
            subject_name: "Biology".to_string(),
            curriculum: "GCSE".to_string(),
            human_title: "Cell Structure".to_string(),
            topic_tags: vec!["cells".to_string()],
            reviewer_id: Some(Uuid::new_v4()),
            requested_by: Uuid::new_v4(),
            requested_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        }
    }

    pub fn prompt(text: &str) -> PromptTemplate {
        PromptTemplate {
            id: Uuid::new_v4(),
            key: "stage.default".to_string(),
            version: 1,
            template_text: text.to_string(),
            model_name: "offline".to_string(),
            model_params: json!({ "temperature": 0.2 }),
        }
    }

    pub fn schema(schema_type: &str, body: Value) -> SchemaTemplate {
        SchemaTemplate {
            id: Uuid::new_v4(),
            schema_type: schema_type.to_string(),
            version: 1,
            schema_body: body.to_string(),
        }
    }
}
