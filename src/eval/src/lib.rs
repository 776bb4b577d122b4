/* src/eval/src/lib.rs */

pub mod expr;
pub mod helpers;

use serde_json::Value;
use thiserror::Error;

pub use expr::PathEvaluator;
pub use helpers::{is_truthy, resolve, stringify};

#[derive(Debug, Error)]
pub enum EvalError {
  #[error("invalid expression '{expr}': {detail}")]
  Parse { expr: String, detail: String },

  #[error("expression '{expr}' did not yield a collection")]
  NotACollection { expr: String },

  #[error("type error in '{expr}': {detail}")]
  Type { expr: String, detail: String },

  #[error("unterminated '@{{' block in template content")]
  UnterminatedBlock,
}

/// Pluggable expression-evaluation boundary consumed by the engine.
///
/// `evaluate` resolves a single expression against a JSON context and
/// returns the resulting value; `eval_template` copies a free-form text
/// block while substituting every `@{expr}` region. Both fail with
/// [`EvalError`] and failures are fatal to the surrounding parse/render.
pub trait Evaluator {
  fn evaluate(&self, expr: &str, context: &Value) -> Result<Value, EvalError>;

  fn eval_template(&self, block: &str, context: &Value) -> Result<String, EvalError>;
}
