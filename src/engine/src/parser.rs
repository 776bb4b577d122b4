/* src/engine/src/parser.rs */

// Tree builder: consumes the XML event stream and produces the element
// tree. Tag matching is validated here with an explicit stack of open
// elements (quick-xml's own end-name checking is switched off so the
// mismatch error carries the open element's name).

use std::fs;
use std::path::Path;

use log::trace;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;
use weft_eval::{Evaluator, is_truthy};

use crate::element::{COMPONENT_PREFIX, Component, Element, ElementKind, Node, Role, is_void};
use crate::error::EngineError;

pub fn parse_file(path: &Path, evaluator: &dyn Evaluator) -> Result<Element, EngineError> {
  let source =
    fs::read_to_string(path).map_err(|e| EngineError::Io { path: path.to_path_buf(), source: e })?;
  parse_str(&source, evaluator)
}

pub fn parse_str(source: &str, evaluator: &dyn Evaluator) -> Result<Element, EngineError> {
  Parser::new(evaluator).run(source)
}

struct Parser<'e> {
  evaluator: &'e dyn Evaluator,
  stack: Vec<Element>,
  last_popped: Option<Element>,
  /// Character data accumulated since the last structural event.
  /// Entity references are kept in source form, so text passes through
  /// to the output untouched.
  pending_text: String,
}

impl<'e> Parser<'e> {
  fn new(evaluator: &'e dyn Evaluator) -> Self {
    Self { evaluator, stack: Vec::new(), last_popped: None, pending_text: String::new() }
  }

  fn run(mut self, source: &str) -> Result<Element, EngineError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().check_end_names = false;

    loop {
      let event = reader.read_event().map_err(|e| EngineError::MalformedMarkup(e.to_string()))?;
      match event {
        Event::Start(ref start) => {
          self.flush_text()?;
          let tag = str_of(start.name().as_ref())?;
          let element = self.open_element(&tag, start)?;
          self.stack.push(element);
        }
        Event::Empty(ref start) => {
          self.flush_text()?;
          let tag = str_of(start.name().as_ref())?;
          let element = self.open_element(&tag, start)?;
          self.complete(element)?;
        }
        Event::End(end) => {
          self.flush_text()?;
          let end_tag = str_of(end.name().as_ref())?;
          let Some(open) = self.stack.pop() else {
            return Err(EngineError::MalformedMarkup(format!("unexpected end tag </{end_tag}>")));
          };
          if open.tag_name != end_tag {
            return Err(EngineError::MalformedMarkup(format!(
              "expected end of <{}>, found </{end_tag}>",
              open.tag_name
            )));
          }
          self.complete(open)?;
        }
        Event::Text(text) => {
          let data = text.decode().map_err(|e| EngineError::MalformedMarkup(e.to_string()))?;
          self.pending_text.push_str(&data);
        }
        Event::GeneralRef(entity) => {
          // Keep the reference as written; output is markup, not plain text.
          let name = entity.decode().map_err(|e| EngineError::MalformedMarkup(e.to_string()))?;
          self.pending_text.push('&');
          self.pending_text.push_str(&name);
          self.pending_text.push(';');
        }
        Event::CData(cdata) => {
          let data = std::str::from_utf8(cdata.as_ref())
            .map_err(|e| EngineError::MalformedMarkup(e.to_string()))?;
          self.pending_text.push_str(data);
        }
        Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
        Event::Eof => break,
      }
    }

    self.flush_text()?;
    if let Some(open) = self.stack.last() {
      return Err(EngineError::MalformedMarkup(format!(
        "document ended with <{}> unclosed",
        open.tag_name
      )));
    }
    let root = self
      .last_popped
      .ok_or_else(|| EngineError::MalformedMarkup("empty document".to_string()))?;
    trace!("parsed document rooted at <{}>", root.tag_name);
    Ok(root)
  }

  /// Build an element from a start tag, classifying directive
  /// attributes on components and copying everything else verbatim.
  fn open_element(
    &mut self,
    tag: &str,
    start: &quick_xml::events::BytesStart<'_>,
  ) -> Result<Element, EngineError> {
    let mut element = Element::new(tag);

    if !tag.starts_with(COMPONENT_PREFIX) {
      for attr in start.attributes() {
        let (name, value) = decode_attr(attr)?;
        element.attributes.push((name, value));
      }
      return Ok(element);
    }

    let mut component = Component::default();
    let mut items_expr = None;
    let mut include_path = None;
    let mut template_path = None;
    let mut slot_ref = None;

    for attr in start.attributes() {
      let (name, value) = decode_attr(attr)?;
      match name.as_str() {
        "x-if" => component.condition = Some(value),
        "x-items" => items_expr = Some(value),
        "x-key" => component.item_key = Some(value),
        "x-text" => component.text_expr = Some(value),
        "x-path" => include_path = Some(value),
        "x-eval" => {
          // The flag value is itself an expression, settled at parse
          // time against an empty context.
          if is_truthy(&self.evaluator.evaluate(&value, &Value::Null)?) {
            component.eval_block = Some(String::new());
          }
        }
        "x-slot" => slot_ref = Some(value),
        "x-named" => component.slot_name = Some(value),
        "x-template" => template_path = Some(value),
        "x-doctype" => match self.stack.first_mut() {
          Some(root) => root.doc_type = Some(value),
          None => element.doc_type = Some(value),
        },
        _ => element.attributes.push((name, value)),
      }
    }

    component.role = if let Some(items_expr) = items_expr {
      Role::List { items_expr }
    } else if tag == "x-layout" {
      let template_path = template_path.ok_or_else(|| {
        EngineError::MalformedMarkup("<x-layout> requires an x-template attribute".to_string())
      })?;
      Role::Layout { template_path }
    } else if let Some(path) = include_path {
      Role::Include { path }
    } else if let Some(name) = slot_ref {
      Role::SlotRef { name }
    } else {
      Role::Tag
    };

    element.kind = ElementKind::Component(component);
    Ok(element)
  }

  /// Trim and place accumulated character data: eval nodes absorb it
  /// as their template block, everything else gets a text child.
  fn flush_text(&mut self) -> Result<(), EngineError> {
    if self.pending_text.is_empty() {
      return Ok(());
    }
    let data = std::mem::take(&mut self.pending_text);
    let trimmed = data.trim();
    if trimmed.is_empty() {
      return Ok(());
    }
    match self.stack.last_mut() {
      Some(top) => {
        if let ElementKind::Component(component) = &mut top.kind
          && let Some(block) = &mut component.eval_block
        {
          block.push_str(trimmed);
        } else {
          top.children.push(Node::Text(trimmed.to_string()));
        }
        Ok(())
      }
      None => {
        Err(EngineError::MalformedMarkup("character data outside the document root".to_string()))
      }
    }
  }

  /// Attach a finished element to its parent, or record it as the
  /// document root when the stack is empty.
  fn complete(&mut self, element: Element) -> Result<(), EngineError> {
    if is_void(element.bare_name()) && !element.children.is_empty() {
      return Err(EngineError::MalformedMarkup(format!(
        "void element <{}> must not have content",
        element.bare_name()
      )));
    }
    match self.stack.last_mut() {
      Some(parent) => parent.children.push(Node::Element(element)),
      None => self.last_popped = Some(element),
    }
    Ok(())
  }
}

fn str_of(bytes: &[u8]) -> Result<String, EngineError> {
  std::str::from_utf8(bytes)
    .map(ToString::to_string)
    .map_err(|e| EngineError::MalformedMarkup(e.to_string()))
}

fn decode_attr(
  attr: Result<quick_xml::events::attributes::Attribute<'_>, quick_xml::events::attributes::AttrError>,
) -> Result<(String, String), EngineError> {
  let attr = attr.map_err(|e| EngineError::MalformedMarkup(e.to_string()))?;
  let name = str_of(attr.key.as_ref())?;
  let value = attr
    .unescape_value()
    .map_err(|e| EngineError::MalformedMarkup(e.to_string()))?
    .into_owned();
  Ok((name, value))
}
