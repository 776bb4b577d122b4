/* src/engine/src/render.rs */

// Renderer: a pure recursive walk over the element tree. The active
// context is threaded as a parameter through every call, and the
// composition state of the document being rendered (slot bindings,
// decorator buckets) travels alongside the tree in a DocFrame, so a
// parsed tree is never mutated and may be rendered concurrently.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use log::debug;
use serde_json::Value;
use weft_eval::{EvalError, Evaluator, is_truthy, stringify};

use crate::element::{Component, Element, ElementKind, Node, Role, is_decorator_tag, is_void};
use crate::error::EngineError;
use crate::parser;

/// Parse/render front end bound to a template root directory and an
/// expression evaluator. Include and layout paths resolve against the
/// root directory; every reference is parsed fresh, so no tree is ever
/// shared between renders.
pub struct Engine<'e> {
  root_dir: PathBuf,
  evaluator: &'e dyn Evaluator,
}

/// Per-document composition state, built by the renderer and passed
/// alongside the tree. For a layout target it holds the page's slot
/// bindings and decorator contributions; for ordinary documents it is
/// empty and slot references fall back to their declared defaults.
struct DocFrame<'a> {
  /// Root of the document being rendered; carries the doctype string.
  root: &'a Element,
  /// Slot name -> bound page element. Absent names render the slot
  /// node's own body.
  bindings: HashMap<&'a str, &'a Element>,
  decorators: DecoratorBuckets<'a>,
  /// Doctype contributed as a child element. Accepted for
  /// compatibility; the attribute form on the page root is what the
  /// emitter prints.
  #[allow(dead_code)]
  doc_type_element: Option<&'a Element>,
  /// Page context captured when the frame was built; slot-bound
  /// elements and decorator contributions render under it.
  bound_scope: &'a Value,
}

impl<'a> DocFrame<'a> {
  fn empty(root: &'a Element, scope: &'a Value) -> Self {
    Self {
      root,
      bindings: HashMap::new(),
      decorators: DecoratorBuckets::default(),
      doc_type_element: None,
      bound_scope: scope,
    }
  }
}

/// Aggregation buckets for page-contributed decorator elements, in
/// contribution order.
#[derive(Default)]
struct DecoratorBuckets<'a> {
  meta: Vec<&'a Element>,
  link: Vec<&'a Element>,
  script: Vec<&'a Element>,
}

impl<'e> Engine<'e> {
  pub fn new(root_dir: impl Into<PathBuf>, evaluator: &'e dyn Evaluator) -> Self {
    Self { root_dir: root_dir.into(), evaluator }
  }

  /// Parse the document at `path` (relative to the engine root).
  pub fn parse(&self, path: &str) -> Result<Element, EngineError> {
    parser::parse_file(&self.root_dir.join(path), self.evaluator)
  }

  /// Render a parsed tree against a context.
  pub fn render(&self, root: &Element, context: &Value) -> Result<String, EngineError> {
    let frame = DocFrame::empty(root, context);
    self.render_element(root, context, &frame, false)
  }

  /// Parse and render in one step.
  pub fn render_path(&self, path: &str, context: &Value) -> Result<String, EngineError> {
    let root = self.parse(path)?;
    self.render(&root, context)
  }

  fn render_node(&self, node: &Node, scope: &Value, frame: &DocFrame<'_>) -> Result<String, EngineError> {
    match node {
      Node::Text(content) => Ok(content.clone()),
      Node::Element(el) => self.render_element(el, scope, frame, false),
    }
  }

  fn render_element(
    &self,
    el: &Element,
    scope: &Value,
    frame: &DocFrame<'_>,
    as_decorator: bool,
  ) -> Result<String, EngineError> {
    match &el.kind {
      ElementKind::Plain => self.render_plain(el, scope, frame),
      ElementKind::Component(component) => {
        self.render_component(el, component, scope, frame, as_decorator)
      }
    }
  }

  fn render_component(
    &self,
    el: &Element,
    component: &Component,
    scope: &Value,
    frame: &DocFrame<'_>,
    as_decorator: bool,
  ) -> Result<String, EngineError> {
    if let Some(condition) = &component.condition
      && !is_truthy(&self.evaluator.evaluate(condition, scope)?)
    {
      return Ok(String::new());
    }

    match &component.role {
      Role::Layout { template_path } => self.render_layout(el, template_path, scope, frame),
      Role::Include { path } => {
        debug!("including '{path}'");
        let include_root = self.parse(path)?;
        let inner = DocFrame::empty(&include_root, scope);
        self.render_element(&include_root, scope, &inner, false)
      }
      Role::SlotRef { name } => match frame.bindings.get(name.as_str()) {
        Some(bound) => self.render_element(bound, frame.bound_scope, frame, false),
        // Unbound slot: the node's own body is the declared default.
        None => self.render_tag(el, component, scope, frame),
      },
      Role::List { items_expr } => self.render_list(el, items_expr, scope, frame),
      Role::Tag => {
        if !as_decorator && is_decorator_tag(el.bare_name()) {
          return self.render_aggregate(el, frame);
        }
        self.render_tag(el, component, scope, frame)
      }
    }
  }

  /// Emit a component as a concrete tag: attributes in source order,
  /// then the text expression, the eval block, or the children.
  fn render_tag(
    &self,
    el: &Element,
    component: &Component,
    scope: &Value,
    frame: &DocFrame<'_>,
  ) -> Result<String, EngineError> {
    let bare = el.bare_name();
    let mut out = String::new();
    out.push('<');
    out.push_str(bare);
    push_attributes(&mut out, &el.attributes);
    if is_void(bare) {
      // Void elements carry no content; the parser guarantees no children.
      out.push_str("/>");
      return Ok(out);
    }
    out.push('>');
    if let Some(expr) = &component.text_expr {
      out.push_str(&stringify(&self.evaluator.evaluate(expr, scope)?));
    } else if let Some(block) = &component.eval_block {
      out.push_str(&self.evaluator.eval_template(block, scope)?);
    } else {
      for child in &el.children {
        out.push_str(&self.render_node(child, scope, frame)?);
      }
    }
    out.push_str("</");
    out.push_str(bare);
    out.push('>');
    Ok(out)
  }

  /// List component: the wrapper tag is emitted once, without
  /// attributes, and the children render once per item with the item
  /// as their full replacement scope.
  fn render_list(
    &self,
    el: &Element,
    items_expr: &str,
    scope: &Value,
    frame: &DocFrame<'_>,
  ) -> Result<String, EngineError> {
    let value = self.evaluator.evaluate(items_expr, scope)?;
    let Value::Array(items) = value else {
      return Err(EvalError::NotACollection { expr: items_expr.to_string() }.into());
    };
    let bare = el.bare_name();
    if is_void(bare) {
      return Ok(format!("<{bare}/>"));
    }
    let mut out = String::new();
    out.push('<');
    out.push_str(bare);
    out.push('>');
    for item in &items {
      for child in &el.children {
        out.push_str(&self.render_node(child, item, frame)?);
      }
    }
    out.push_str("</");
    out.push_str(bare);
    out.push('>');
    Ok(out)
  }

  /// Decorator aggregation point: emit every contribution registered
  /// under this category, in contribution order. The point itself
  /// produces no tag. Meta contributions go through component
  /// rendering directly; link and script re-enter full dispatch.
  fn render_aggregate(&self, el: &Element, frame: &DocFrame<'_>) -> Result<String, EngineError> {
    let mut out = String::new();
    match el.bare_name() {
      "meta" => {
        for contributed in &frame.decorators.meta {
          out.push_str(&match &contributed.kind {
            ElementKind::Component(c) => {
              self.render_component(contributed, c, frame.bound_scope, frame, true)?
            }
            ElementKind::Plain => self.render_plain(contributed, frame.bound_scope, frame)?,
          });
        }
      }
      "link" => {
        for contributed in &frame.decorators.link {
          out.push_str(&self.render_element(contributed, frame.bound_scope, frame, true)?);
        }
      }
      "script" => {
        for contributed in &frame.decorators.script {
          out.push_str(&self.render_element(contributed, frame.bound_scope, frame, true)?);
        }
      }
      _ => return Err(EngineError::UnsupportedDecorator(el.tag_name.clone())),
    }
    Ok(out)
  }

  /// Layout composition: parse the layout document, bind this page's
  /// direct children into its declared slots and decorator buckets,
  /// then render the layout under the new frame. Binding completes
  /// before any rendering starts; resolution during the render only
  /// reads the populated frame.
  fn render_layout(
    &self,
    el: &Element,
    template_path: &str,
    scope: &Value,
    frame: &DocFrame<'_>,
  ) -> Result<String, EngineError> {
    debug!("composing layout '{template_path}'");
    let template_root = self.parse(template_path)?;
    let declared = collect_slot_names(&template_root);

    let mut bindings: HashMap<&str, &Element> = HashMap::new();
    let mut decorators = DecoratorBuckets::default();
    let mut doc_type_element = None;

    for child in el.child_elements() {
      if let Some(component) = child.component()
        && let Some(name) = &component.slot_name
        && declared.contains(name.as_str())
      {
        bindings.insert(name.as_str(), child);
        continue;
      }
      match child.bare_name() {
        "doctype" => doc_type_element = Some(child),
        "meta" => decorators.meta.push(child),
        "link" => decorators.link.push(child),
        "script" => decorators.script.push(child),
        other if is_decorator_tag(other) => {
          // `style` sits in the decorator family but has no bucket.
          return Err(EngineError::UnsupportedDecorator(child.tag_name.clone()));
        }
        other => {
          debug!("layout child <{other}> matches no slot or decorator; dropped");
        }
      }
    }

    let mut out = String::new();
    if let Some(doc_type) = &frame.root.doc_type {
      out.push_str(doc_type);
    }
    let inner =
      DocFrame { root: &template_root, bindings, decorators, doc_type_element, bound_scope: scope };
    out.push_str(&self.render_element(&template_root, scope, &inner, false)?);
    Ok(out)
  }

  fn render_plain(
    &self,
    el: &Element,
    scope: &Value,
    frame: &DocFrame<'_>,
  ) -> Result<String, EngineError> {
    let mut out = String::new();
    out.push('<');
    out.push_str(&el.tag_name);
    push_attributes(&mut out, &el.attributes);
    if is_void(&el.tag_name) {
      out.push_str("/>");
      return Ok(out);
    }
    out.push('>');
    for child in &el.children {
      out.push_str(&self.render_node(child, scope, frame)?);
    }
    out.push_str("</");
    out.push_str(&el.tag_name);
    out.push('>');
    Ok(out)
  }
}

fn push_attributes(out: &mut String, attributes: &[(String, String)]) {
  for (name, value) in attributes {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
  }
}

/// Slot names declared anywhere in a layout document. Only declared
/// names are bindable; page contributions naming anything else fall
/// through to decorator classification.
fn collect_slot_names(root: &Element) -> HashSet<&str> {
  fn walk<'a>(el: &'a Element, names: &mut HashSet<&'a str>) {
    if let Some(component) = el.component()
      && let Role::SlotRef { name } = &component.role
    {
      names.insert(name.as_str());
    }
    for child in el.child_elements() {
      walk(child, names);
    }
  }
  let mut names = HashSet::new();
  walk(root, &mut names);
  names
}
