//! Generation engine: prompt rendering plus schema synthesis.
//!
//! The engine owns one seeded random source for its whole lifetime. Two
//! engines built with the same seed produce the same sequence of raw
//! outputs for the same sequence of calls. The random source sits behind
//! a mutex, so an engine can be shared across threads; a single call holds
//! the lock for its entire synthesis.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::schema::{SchemaDecodeError, SchemaNode};
use crate::synthesizer::Synthesizer;
use crate::template::{render, Inputs};
use crate::types::{PromptTemplate, SchemaTemplate};

/// Errors from a generation call.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Schema(#[from] SchemaDecodeError),

    #[error("Failed to encode raw output: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The result of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Synthesized value as compact JSON, object keys sorted
    pub raw: Vec<u8>,

    /// The rendered prompt, or `None` if the template did not parse
    pub prompt_render: Option<String>,
}

/// Renders prompts and synthesizes raw output from schemas.
pub struct GenerationEngine {
    rng: Mutex<StdRng>,
    synthesizer: Synthesizer,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl GenerationEngine {
    /// Create an engine using the system clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let synthesizer = Synthesizer::new()
            .with_clock(Arc::clone(&clock))
            .with_placeholder_email(config.placeholder_email.clone());

        Self {
            rng: Mutex::new(rng),
            synthesizer,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current time according to the engine's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Synthesize raw output for `schema`.
    ///
    /// The prompt is rendered against `inputs` for logging only; a template
    /// error is logged and otherwise ignored. A schema body that is not
    /// valid JSON is an error.
    pub fn generate(
        &self,
        prompt: &PromptTemplate,
        schema: &SchemaTemplate,
        inputs: &Inputs,
    ) -> Result<Vec<u8>, GenerationError> {
        Ok(self.generate_with_render(prompt, schema, inputs)?.raw)
    }

    /// Like [`generate`](Self::generate), also returning the rendered prompt.
    pub fn generate_with_render(
        &self,
        prompt: &PromptTemplate,
        schema: &SchemaTemplate,
        inputs: &Inputs,
    ) -> Result<Generation, GenerationError> {
        let prompt_render = match render(&prompt.template_text, inputs) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    prompt_key = %prompt.key,
                    prompt_id = %prompt.id,
                    error = %e,
                    "Prompt template failed to render"
                );
                None
            }
        };

        let node = SchemaNode::parse(&schema.schema_body)?;

        let value = {
            let mut rng = self.rng.lock();
            self.synthesizer.synthesize(&node, &mut *rng)
        };

        let raw = serde_json::to_vec(&value).map_err(GenerationError::Encode)?;

        tracing::debug!(
            schema_id = %schema.id,
            schema_type = %schema.schema_type,
            bytes = raw.len(),
            "Synthesized raw output"
        );

        Ok(Generation { raw, prompt_render })
    }
}

impl std::fmt::Debug for GenerationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for GenerationEngine.
pub struct GenerationEngineBuilder {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl GenerationEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the seed, overriding the configuration.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the engine.
    pub fn build(self) -> GenerationEngine {
        GenerationEngine::with_clock(self.config, self.clock)
    }
}

impl Default for GenerationEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
