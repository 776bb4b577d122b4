/* src/engine/src/error.rs */

use std::path::PathBuf;

use thiserror::Error;
use weft_eval::EvalError;

#[derive(Debug, Error)]
pub enum EngineError {
  /// End tag does not match the open start tag, unclosed or empty
  /// document, void element with content, or an underlying reader
  /// fault. Fatal: the parse aborts with no partial tree.
  #[error("malformed markup: {0}")]
  MalformedMarkup(String),

  /// Evaluator failure. Fatal: the render aborts with no partial output.
  #[error(transparent)]
  Expression(#[from] EvalError),

  /// Decorator-family tag outside the aggregatable set {meta, link, script}.
  #[error("unsupported decorator tag '{0}'")]
  UnsupportedDecorator(String),

  #[error("cannot read template '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
