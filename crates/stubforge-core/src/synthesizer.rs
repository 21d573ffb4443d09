//! Synthesizer: turns a decoded schema into a conforming value.
//!
//! Dispatch per node, first match wins:
//! 1. `const` → the literal
//! 2. `enum` → a uniform choice
//! 3. `anyOf`/`oneOf` → a uniform choice of alternative, synthesized
//! 4. `allOf` → every alternative, shallow-merged when all are objects
//! 5. `type` → object, array, string, integer, number or boolean
//! 6. bare `properties` → object
//! 7. anything else → null
//!
//! Output is a pure function of the schema and the draws taken from the
//! random source (and the clock, for `date-time` strings). Object keys are
//! visited in sorted order so the draw sequence never depends on map
//! iteration order.

use std::sync::Arc;

use chrono::SecondsFormat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Number, Value};

use crate::clock::{Clock, SystemClock};
use crate::schema::{ArraySchema, NumericBounds, SchemaNode, StringFormat, StringSchema};

/// Address returned for `format: email` unless configured otherwise.
pub const DEFAULT_PLACEHOLDER_EMAIL: &str = "placeholder@example.com";

const DEFAULT_MIN_ITEMS: i64 = 1;
const DEFAULT_EXTRA_ITEMS: i64 = 2;
const DEFAULT_MIN_LENGTH: i64 = 5;
const DEFAULT_EXTRA_LENGTH: i64 = 10;
const DEFAULT_INTEGER_SPAN: i64 = 10;
const DEFAULT_NUMBER_SPAN: f64 = 10.0;
const MAX_WORD_LENGTH: usize = 8;

/// Produces values from schema nodes.
#[derive(Clone)]
pub struct Synthesizer {
    clock: Arc<dyn Clock>,
    placeholder_email: String,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            placeholder_email: DEFAULT_PLACEHOLDER_EMAIL.to_string(),
        }
    }

    /// Use `clock` for `date-time` strings.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use `email` for `format: email` strings.
    pub fn with_placeholder_email(mut self, email: impl Into<String>) -> Self {
        self.placeholder_email = email.into();
        self
    }

    /// Synthesize a value for `node`, drawing from `rng`.
    pub fn synthesize<R: Rng + ?Sized>(&self, node: &SchemaNode, rng: &mut R) -> Value {
        match node {
            SchemaNode::Const(literal) => literal.clone(),
            SchemaNode::Enum(choices) => choices.choose(rng).cloned().unwrap_or(Value::Null),
            SchemaNode::OneOf(alternatives) => match alternatives.choose(rng) {
                Some(alternative) => self.synthesize(alternative, rng),
                None => Value::Null,
            },
            SchemaNode::AllOf(parts) => self.synthesize_all_of(parts, rng),
            SchemaNode::Object(properties) => {
                let mut object = Map::new();
                for (name, property) in properties {
                    object.insert(name.clone(), self.synthesize(property, rng));
                }
                Value::Object(object)
            }
            SchemaNode::Array(array) => self.synthesize_array(array, rng),
            SchemaNode::String(string) => self.synthesize_string(string, rng),
            SchemaNode::Integer(bounds) => synthesize_integer(bounds, rng),
            SchemaNode::Number(bounds) => synthesize_number(bounds, rng),
            SchemaNode::Boolean => Value::Bool(rng.gen()),
            SchemaNode::Unknown => Value::Null,
        }
    }

    /// Merge object results left to right; later keys overwrite earlier ones.
    ///
    /// The first non-object result is returned as-is and the remaining
    /// parts are not synthesized.
    fn synthesize_all_of<R: Rng + ?Sized>(&self, parts: &[SchemaNode], rng: &mut R) -> Value {
        let mut merged = Map::new();
        for part in parts {
            match self.synthesize(part, rng) {
                Value::Object(object) => merged.extend(object),
                other => return other,
            }
        }
        Value::Object(merged)
    }

    fn synthesize_array<R: Rng + ?Sized>(&self, array: &ArraySchema, rng: &mut R) -> Value {
        let Some(items) = array.items.as_deref() else {
            return Value::Array(Vec::new());
        };

        let min = array.min_items.unwrap_or(DEFAULT_MIN_ITEMS).max(0);
        let max = array
            .max_items
            .unwrap_or_else(|| min.saturating_add(DEFAULT_EXTRA_ITEMS))
            .max(min);
        let count = rng.gen_range(min..=max);

        Value::Array((0..count).map(|_| self.synthesize(items, rng)).collect())
    }

    fn synthesize_string<R: Rng + ?Sized>(&self, string: &StringSchema, rng: &mut R) -> Value {
        if let Some(example) = string.examples.choose(rng) {
            return example.clone();
        }

        if let Some(default) = &string.default {
            return default.clone();
        }

        match string.format {
            Some(StringFormat::Uuid) => {
                let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
                Value::String(uuid.hyphenated().to_string())
            }
            Some(StringFormat::DateTime) => Value::String(
                self.clock
                    .now()
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            Some(StringFormat::Email) => Value::String(self.placeholder_email.clone()),
            None => {
                let (min, max) = length_bounds(string.min_length, string.max_length);
                let length = rng.gen_range(min..=max) as usize;
                Value::String(lowercase_words(length, rng))
            }
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("placeholder_email", &self.placeholder_email)
            .finish_non_exhaustive()
    }
}

/// Inclusive string length range.
///
/// A missing `minLength` defaults to 5 but never exceeds an explicit
/// `maxLength`. When both are explicit and contradict, `minLength` wins.
fn length_bounds(min_length: Option<i64>, max_length: Option<i64>) -> (i64, i64) {
    let min = match (min_length, max_length) {
        (Some(min), _) => min,
        (None, Some(max)) => DEFAULT_MIN_LENGTH.min(max),
        (None, None) => DEFAULT_MIN_LENGTH,
    }
    .max(0);
    let max = max_length
        .unwrap_or_else(|| min.saturating_add(DEFAULT_EXTRA_LENGTH))
        .max(min);
    (min, max)
}

/// Fractional bounds round inwards so the value stays inside them. When no
/// integer lies between the bounds, the rounded-up minimum is returned.
fn synthesize_integer<R: Rng + ?Sized>(bounds: &NumericBounds, rng: &mut R) -> Value {
    let min = bounds.minimum.map(|m| m.ceil() as i64).unwrap_or(0);
    let max = bounds
        .maximum
        .map(|m| m.floor() as i64)
        .unwrap_or_else(|| min.saturating_add(DEFAULT_INTEGER_SPAN))
        .max(min);
    Value::from(rng.gen_range(min..=max))
}

fn synthesize_number<R: Rng + ?Sized>(bounds: &NumericBounds, rng: &mut R) -> Value {
    let min = bounds.minimum.unwrap_or(0.0);
    let max = bounds.maximum.unwrap_or(min + DEFAULT_NUMBER_SPAN);

    let value = if max > min && (max - min).is_finite() {
        rng.gen_range(min..=max)
    } else {
        min
    };

    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Exactly `length` bytes of lowercase words separated by single spaces.
fn lowercase_words<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    let mut out = String::with_capacity(length);

    while out.len() < length {
        if !out.is_empty() {
            if length - out.len() == 1 {
                out.push(random_letter(rng));
                break;
            }
            out.push(' ');
        }

        let word_length = rng.gen_range(2..=MAX_WORD_LENGTH).min(length - out.len());
        for _ in 0..word_length {
            out.push(random_letter(rng));
        }
    }

    out
}

fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    rng.gen_range(b'a'..=b'z') as char
}
