//! Plan stage: a titled study plan built from the intents.

use crate::artifact::{Artifact, ArtifactType};
use crate::engine::GenerationEngine;
use crate::types::{DocumentReference, Intent, Plan, PromptTemplate, SchemaTemplate};

use super::{artifact_builder, document_inputs, execute, insert_input, StageError};

/// Generate a plan for `document`. Inputs: `{title, intents}`.
///
/// A plan without a title cannot seed the eval stage, so a missing title is
/// an error and no artifact is returned. A title of only whitespace counts
/// as missing: it would render as an empty heading in the eval prompt.
///
/// # Errors
///
/// [`StageError::PlanTitleRequired`] for an empty or whitespace-only title,
/// [`StageError::PayloadDecode`] when the output is not a plan object.
pub fn generate_plan(
    engine: &GenerationEngine,
    document: &DocumentReference,
    intents: &[Intent],
    prompt: &PromptTemplate,
    schema: &SchemaTemplate,
) -> Result<(Plan, Artifact), StageError> {
    let stage = ArtifactType::Plan;
    let mut inputs = document_inputs(document);
    insert_input(&mut inputs, stage, "intents", &intents)?;

    let generation = execute(engine, stage, document, prompt, schema, &inputs)?;

    let plan: Plan = serde_json::from_slice(&generation.raw)
        .map_err(|source| StageError::PayloadDecode { stage, source })?;

    if plan.title.trim().is_empty() {
        return Err(StageError::PlanTitleRequired);
    }

    let artifact =
        artifact_builder(stage, document, prompt, schema, &generation, engine.now()).build();

    tracing::debug!(steps = plan.steps.len(), "Plan stage complete");
    Ok((plan, artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::stages::fixtures;
    use serde_json::json;

    fn plan_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "examples": ["Cells in a week"] },
                "steps": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 4,
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "objectives": { "type": "array", "items": { "type": "string" } }
                        }
                    }
                }
            }
        })
    }

    fn intents() -> Vec<Intent> {
        vec![Intent {
            title: "Organelles".to_string(),
            description: "Name the main organelles".to_string(),
        }]
    }

    #[test]
    fn test_plan_decoded() {
        let engine = GenerationEngine::new(EngineConfig::seeded(2));
        let prompt = fixtures::prompt("Plan {{.title}} covering {{.intents.0.title}}");
        let schema = fixtures::schema("plan", plan_schema());

        let (plan, artifact) =
            generate_plan(&engine, &fixtures::document(), &intents(), &prompt, &schema).unwrap();

        assert_eq!(plan.title, "Cells in a week");
        assert!((1..=4).contains(&plan.steps.len()));
        assert!(plan.steps.iter().all(|s| !s.objectives.is_empty()));

        assert_eq!(artifact.artifact_type, ArtifactType::Plan);
        assert_eq!(
            artifact.prompt_render.as_deref(),
            Some("Plan Cell Structure covering Organelles")
        );
        let raw: Plan = serde_json::from_str(&artifact.output_raw).unwrap();
        assert_eq!(raw, plan);
    }

    #[test]
    fn test_empty_title_is_an_error() {
        let engine = GenerationEngine::new(EngineConfig::seeded(2));
        let schema = fixtures::schema(
            "plan",
            json!({ "type": "object", "properties": { "title": { "const": "" } } }),
        );

        let result = generate_plan(
            &engine,
            &fixtures::document(),
            &intents(),
            &fixtures::prompt(""),
            &schema,
        );
        assert!(matches!(result, Err(StageError::PlanTitleRequired)));
    }

    #[test]
    fn test_whitespace_title_is_an_error() {
        let engine = GenerationEngine::new(EngineConfig::seeded(2));
        let schema = fixtures::schema(
            "plan",
            json!({ "type": "object", "properties": { "title": { "const": " \t\n" } } }),
        );

        let result = generate_plan(&engine, &fixtures::document(), &[], &fixtures::prompt(""), &schema);
        assert!(matches!(result, Err(StageError::PlanTitleRequired)));
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let engine = GenerationEngine::new(EngineConfig::seeded(2));
        let schema = fixtures::schema("plan", json!({ "type": "object" }));

        let result = generate_plan(&engine, &fixtures::document(), &[], &fixtures::prompt(""), &schema);
        assert!(matches!(result, Err(StageError::PlanTitleRequired)));
    }

    #[test]
    fn test_non_object_payload_is_a_decode_error() {
        let engine = GenerationEngine::new(EngineConfig::seeded(2));
        let schema = fixtures::schema("plan", json!({ "type": "integer" }));

        let result = generate_plan(&engine, &fixtures::document(), &[], &fixtures::prompt(""), &schema);
        assert!(matches!(
            result,
            Err(StageError::PayloadDecode { stage: ArtifactType::Plan, .. })
        ));
    }
}
