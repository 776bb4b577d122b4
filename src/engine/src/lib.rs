/* src/engine/src/lib.rs */

//! Weft template engine core.
//!
//! Source markup is an XML-flavored tag language: elements carrying the
//! `x-` prefix are components whose reserved attributes (`x-if`,
//! `x-items`, `x-text`, `x-eval`, `x-path`, `x-slot`, `x-named`,
//! `x-template`, `x-doctype`, `x-key`) configure rendering behavior
//! instead of becoming output attributes. Parsing builds an immutable
//! element tree; rendering walks it against a `serde_json::Value`
//! context and produces a single markup string. A page document can
//! compose itself into a separately parsed layout document through
//! named slots and aggregated meta/link/script decorators.

pub mod element;
pub mod error;
pub mod parser;
pub mod render;

pub use element::{
  COMPONENT_PREFIX, Component, DECORATOR_TAGS, Element, ElementKind, Node, Observer, Role,
  VOID_ELEMENTS,
};
pub use error::EngineError;
pub use parser::{parse_file, parse_str};
pub use render::Engine;
