/* src/engine/src/element.rs */

// Element tree produced by the parser. Structure is frozen after the
// parse pass; rendering never mutates it, so a parsed tree can be
// rendered concurrently from independent contexts.

/// Reserved namespace prefix carried by component (directive-capable) tags.
pub const COMPONENT_PREFIX: &str = "x-";

/// HTML void elements: emitted without a closing tag and without
/// content. The parser rejects void elements that carry children.
pub const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
  "track", "wbr",
];

/// Tag names with decorator meaning inside layout composition. Only
/// `meta`, `link` and `script` have aggregation buckets; `doctype` is
/// recorded on the frame and `style` has no bucket at all.
pub const DECORATOR_TAGS: &[&str] = &["doctype", "meta", "link", "script", "style"];

pub fn is_void(bare_name: &str) -> bool {
  VOID_ELEMENTS.contains(&bare_name.to_ascii_lowercase().as_str())
}

pub fn is_decorator_tag(bare_name: &str) -> bool {
  DECORATOR_TAGS.contains(&bare_name)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  Text(String),
  Element(Element),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
  /// Tag name as written in source, prefix included for components.
  pub tag_name: String,
  /// Plain attributes in source order. Directive attributes are
  /// classified into `kind` instead and never appear here.
  pub attributes: Vec<(String, String)>,
  pub children: Vec<Node>,
  pub kind: ElementKind,
  /// Document-type string, set on the document root only (written by
  /// an `x-doctype` attribute anywhere in the document).
  pub doc_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
  /// Ordinary markup element; attributes pass through verbatim.
  Plain,
  /// `x-` prefixed element carrying directive state.
  Component(Component),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
  /// `x-if` — the element (and everything under it) renders only when
  /// this evaluates truthy.
  pub condition: Option<String>,
  /// `x-text` — evaluated expression becomes the element content.
  pub text_expr: Option<String>,
  /// Inline template block collected from character data when the
  /// element is an eval node (`x-eval`).
  pub eval_block: Option<String>,
  /// `x-named` — marks a named-slot contributor for layout binding.
  pub slot_name: Option<String>,
  /// `x-key` — per-item identity for list children. Carried for the
  /// change-notification extension point; the renderer does not read it.
  pub item_key: Option<String>,
  pub role: Role,
}

/// The mutually exclusive render behaviors of a component element.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Role {
  /// Emitted as a tag named by the prefix-stripped tag name.
  #[default]
  Tag,
  /// `x-items` — iterate a collection, re-rendering children once per
  /// item with the item as the full replacement scope.
  List { items_expr: String },
  /// `x-path` — parse and render another document inline, no wrapper.
  Include { path: String },
  /// `<x-layout x-template="...">` — compose this page into a layout.
  Layout { template_path: String },
  /// `x-slot` — insertion point; bound page content renders here, own
  /// body is the default.
  SlotRef { name: String },
}

impl Element {
  pub fn new(tag_name: impl Into<String>) -> Self {
    Self {
      tag_name: tag_name.into(),
      attributes: Vec::new(),
      children: Vec::new(),
      kind: ElementKind::Plain,
      doc_type: None,
    }
  }

  pub fn is_component(&self) -> bool {
    matches!(self.kind, ElementKind::Component(_))
  }

  pub fn component(&self) -> Option<&Component> {
    match &self.kind {
      ElementKind::Component(c) => Some(c),
      ElementKind::Plain => None,
    }
  }

  /// Tag name with the component prefix stripped — the name actually
  /// emitted into markup.
  pub fn bare_name(&self) -> &str {
    self.tag_name.strip_prefix(COMPONENT_PREFIX).unwrap_or(&self.tag_name)
  }

  /// Child elements, skipping interleaved text nodes.
  pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
    self.children.iter().filter_map(|node| match node {
      Node::Element(el) => Some(el),
      Node::Text(_) => None,
    })
  }
}

/// Change-notification extension point. Nothing in the rendering path
/// calls into this; an embedding application may register interest in
/// nodes (keyed by their `x-key` values) to drive external updates.
pub trait Observer {
  fn subscribe(&mut self, key: &str, node: &Element);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_name_strips_prefix() {
    assert_eq!(Element::new("x-div").bare_name(), "div");
    assert_eq!(Element::new("div").bare_name(), "div");
  }

  #[test]
  fn void_table_matches_case_insensitively() {
    assert!(is_void("br"));
    assert!(is_void("BR"));
    assert!(is_void("input"));
    assert!(!is_void("div"));
    assert!(!is_void("i"));
  }

  #[test]
  fn decorator_tags_fixed_set() {
    for tag in ["doctype", "meta", "link", "script", "style"] {
      assert!(is_decorator_tag(tag));
    }
    assert!(!is_decorator_tag("div"));
  }

  #[test]
  fn child_elements_skips_text() {
    let mut el = Element::new("x-p");
    el.children.push(Node::Text("hello".to_string()));
    el.children.push(Node::Element(Element::new("span")));
    assert_eq!(el.child_elements().count(), 1);
  }
}
