//! Runs the three stages in order for one document.

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::engine::GenerationEngine;
use crate::stages::{generate_eval, generate_intents, generate_plan, StageError};
use crate::types::{
    DocumentReference, Eval, EvalItem, Intent, Plan, PromptTemplate, SchemaTemplate,
};

/// The prompt and schema used for one stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageTemplates {
    pub prompt: PromptTemplate,
    pub schema: SchemaTemplate,
}

/// Templates for all three stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineTemplates {
    pub intents: StageTemplates,
    pub plan: StageTemplates,
    pub eval: StageTemplates,
}

/// Everything a full run produces, ready for the caller to persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineOutput {
    pub intents: Vec<Intent>,
    pub plan: Plan,
    pub eval: Eval,
    pub eval_items: Vec<EvalItem>,

    /// One artifact per stage, in stage order
    pub artifacts: Vec<Artifact>,
}

/// Run intents → plan → eval for `document`.
///
/// The first stage error aborts the run.
pub fn run_pipeline(
    engine: &GenerationEngine,
    document: &DocumentReference,
    templates: &PipelineTemplates,
) -> Result<PipelineOutput, StageError> {
    let (intents, intents_artifact) = generate_intents(
        engine,
        document,
        &templates.intents.prompt,
        &templates.intents.schema,
    )?;

    let (plan, plan_artifact) = generate_plan(
        engine,
        document,
        &intents,
        &templates.plan.prompt,
        &templates.plan.schema,
    )?;

    let (eval, eval_items, eval_artifact) = generate_eval(
        engine,
        document,
        &plan,
        &templates.eval.prompt,
        &templates.eval.schema,
    )?;

    tracing::info!(
        document_id = %document.id,
        eval_id = %eval.id,
        intents = intents.len(),
        items = eval_items.len(),
        "Pipeline complete"
    );

    Ok(PipelineOutput {
        intents,
        plan,
        eval,
        eval_items,
        artifacts: vec![intents_artifact, plan_artifact, eval_artifact],
    })
}
