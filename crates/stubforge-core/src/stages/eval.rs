//! Eval stage: a draft quiz built from the plan.
//!
//! Items are repaired rather than rejected:
//! - fewer than two options → the configured fallback pair
//! - `correct_index` outside `[0, options.len())` → 0

use uuid::Uuid;

use crate::artifact::{Artifact, ArtifactType};
use crate::engine::GenerationEngine;
use crate::types::{
    DocumentReference, Eval, EvalItem, EvalItemPayload, EvalPayload, EvalStatus, Plan,
    PromptTemplate, SchemaTemplate,
};

use super::{artifact_builder, document_inputs, execute, insert_input, StageError};

/// Generate a draft eval for `document`. Inputs: `{title, plan}`.
///
/// The eval, its items and the artifact share one creation timestamp. The
/// artifact's `eval_id` and every item's `eval_id` are the eval's id.
///
/// A title of only whitespace is treated as missing, since reviewers list
/// evals by title and a blank one cannot be told apart from an absent one.
///
/// # Errors
///
/// [`StageError::EvalTitleRequired`] for an empty or whitespace-only title,
/// [`StageError::PayloadDecode`] when the output is not an eval object.
pub fn generate_eval(
    engine: &GenerationEngine,
    document: &DocumentReference,
    plan: &Plan,
    prompt: &PromptTemplate,
    schema: &SchemaTemplate,
) -> Result<(Eval, Vec<EvalItem>, Artifact), StageError> {
    let stage = ArtifactType::Eval;
    let mut inputs = document_inputs(document);
    insert_input(&mut inputs, stage, "plan", plan)?;

    let generation = execute(engine, stage, document, prompt, schema, &inputs)?;

    let payload: EvalPayload = serde_json::from_slice(&generation.raw)
        .map_err(|source| StageError::PayloadDecode { stage, source })?;

    if payload.title.trim().is_empty() {
        return Err(StageError::EvalTitleRequired);
    }

    let created_at = engine.now();
    let eval = Eval {
        id: Uuid::new_v4(),
        document_id: document.id,
        title: payload.title,
        description: payload.description,
        status: EvalStatus::Draft,
        created_by: document.requested_by,
        created_at,
    };

    let fallback = &engine.config().fallback_options;
    let items: Vec<EvalItem> = payload
        .items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            let item = normalize_item(item, fallback);
            EvalItem {
                id: Uuid::new_v4(),
                eval_id: eval.id,
                position,
                prompt: item.prompt,
                options: item.options,
                correct_index: item.correct_index as usize,
                hint: item.hint,
                explanation: item.explanation,
                created_at,
            }
        })
        .collect();

    let artifact = artifact_builder(stage, document, prompt, schema, &generation, created_at)
        .eval(eval.id)
        .build();

    tracing::debug!(eval_id = %eval.id, items = items.len(), "Eval stage complete");
    Ok((eval, items, artifact))
}

/// Repair an item so it has at least two options and a valid correct index.
pub fn normalize_item(mut item: EvalItemPayload, fallback: &[String; 2]) -> EvalItemPayload {
    if item.options.len() < 2 {
        item.options = fallback.to_vec();
    }

    let in_range = usize::try_from(item.correct_index)
        .map(|index| index < item.options.len())
        .unwrap_or(false);
    if !in_range {
        item.correct_index = 0;
    }

    item
}
