//! Intent stage: topic-level learning intents for a document.
//!
//! Intents are advisory context for the plan stage, so a payload that does
//! not decode yields an empty list instead of an error.

use crate::artifact::{Artifact, ArtifactType};
use crate::engine::GenerationEngine;
use crate::types::{DocumentReference, Intent, IntentsPayload, PromptTemplate, SchemaTemplate};

use super::{artifact_builder, document_inputs, execute, StageError};

/// Generate intents for `document`. Inputs: `{title}`.
pub fn generate_intents(
    engine: &GenerationEngine,
    document: &DocumentReference,
    prompt: &PromptTemplate,
    schema: &SchemaTemplate,
) -> Result<(Vec<Intent>, Artifact), StageError> {
    let stage = ArtifactType::Intents;
    let inputs = document_inputs(document);
    let generation = execute(engine, stage, document, prompt, schema, &inputs)?;

    let intents = match serde_json::from_slice::<IntentsPayload>(&generation.raw) {
        Ok(payload) => payload.intents,
        Err(e) => {
            tracing::warn!(
                document_id = %document.id,
                error = %e,
                "Intent payload did not decode, continuing with no intents"
            );
            Vec::new()
        }
    };

    let artifact =
        artifact_builder(stage, document, prompt, schema, &generation, engine.now()).build();

    tracing::debug!(count = intents.len(), "Intent stage complete");
    Ok((intents, artifact))
}
