//! # stubforge-core
//!
//! Offline stand-in for a content-generation pipeline.
//!
//! A document request flows through three stages (intents, plan, eval).
//! Each stage renders a prompt template against its inputs and then, in
//! place of a model call, synthesizes output that conforms to the stage's
//! JSON Schema. The output is decoded into typed payloads and recorded as an
//! `Artifact` for review.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same seed and inputs always produce the same raw output
//! 2. **No model calls**: All output is synthesized from the schema
//! 3. **Schema-shaped**: Synthesized values satisfy the keywords they were built from
//! 4. **Linked**: Eval items and the eval artifact carry the eval's id
//!
//! ## Example
//!
//! ```rust,ignore
//! use stubforge_core::{run_pipeline, EngineConfig, GenerationEngine};
//!
//! let engine = GenerationEngine::new(EngineConfig::seeded(42));
//! let output = run_pipeline(&engine, &document, &templates)?;
//!
//! println!("{} items in {}", output.eval_items.len(), output.eval.title);
//! for artifact in &output.artifacts {
//!     println!("{}: {}", artifact.artifact_type, artifact.output_raw);
//! }
//! ```

pub mod artifact;
pub mod clock;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod schema;
pub mod stages;
pub mod synthesizer;
pub mod template;
pub mod types;

// Re-export main types at crate root
pub use artifact::{Artifact, ArtifactBuilder, ArtifactStatus, ArtifactType};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Generation, GenerationEngine, GenerationEngineBuilder, GenerationError};
pub use pipeline::{run_pipeline, PipelineOutput, PipelineTemplates, StageTemplates};
pub use schema::{SchemaDecodeError, SchemaNode};
pub use stages::{generate_eval, generate_intents, generate_plan, normalize_item, StageError};
pub use synthesizer::Synthesizer;
pub use template::{render, Inputs, TemplateError};
pub use types::{
    DocumentReference, Eval, EvalItem, EvalItemPayload, EvalPayload, EvalStatus, Intent,
    IntentsPayload, Plan, PlanStep, PromptTemplate, SchemaTemplate,
};
