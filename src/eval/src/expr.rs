/* src/eval/src/expr.rs */

// Default Evaluator implementation: a small recursive-descent grammar
// over dot-path lookups into the JSON context.
//
//   expression := equality
//   equality   := additive ( ("==" | "!=") additive )*
//   additive   := unary ( "+" unary )*
//   unary      := "!" unary | primary
//   primary    := literal | path [ ".size()" | ".length()" ]
//
// Unresolvable paths evaluate to Null so conditionals treat them as
// false; syntax errors and operator type mismatches are fatal.

use serde_json::Value;

use crate::helpers::{is_truthy, resolve, stringify};
use crate::{EvalError, Evaluator};

#[derive(Debug, Default)]
pub struct PathEvaluator;

impl PathEvaluator {
  pub fn new() -> Self {
    Self
  }
}

impl Evaluator for PathEvaluator {
  fn evaluate(&self, expr: &str, context: &Value) -> Result<Value, EvalError> {
    let mut cursor = Cursor::new(expr);
    let value = cursor.expression(context)?;
    cursor.skip_ws();
    if !cursor.done() {
      return Err(cursor.syntax("unexpected trailing input"));
    }
    Ok(value)
  }

  fn eval_template(&self, block: &str, context: &Value) -> Result<String, EvalError> {
    let mut out = String::with_capacity(block.len());
    let mut rest = block;
    while let Some(open) = rest.find("@{") {
      out.push_str(&rest[..open]);
      let after = &rest[open + 2..];
      let Some(close) = after.find('}') else {
        return Err(EvalError::UnterminatedBlock);
      };
      let value = self.evaluate(after[..close].trim(), context)?;
      out.push_str(&stringify(&value));
      rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
  }
}

struct Cursor<'a> {
  src: &'a str,
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Cursor<'a> {
  fn new(src: &'a str) -> Self {
    Self { src, bytes: src.as_bytes(), pos: 0 }
  }

  fn done(&self) -> bool {
    self.pos >= self.bytes.len()
  }

  fn peek(&self) -> Option<u8> {
    self.bytes.get(self.pos).copied()
  }

  fn skip_ws(&mut self) {
    while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
      self.pos += 1;
    }
  }

  fn eat(&mut self, token: &str) -> bool {
    if self.src[self.pos..].starts_with(token) {
      self.pos += token.len();
      true
    } else {
      false
    }
  }

  fn syntax(&self, detail: &str) -> EvalError {
    EvalError::Parse { expr: self.src.to_string(), detail: format!("{detail} at offset {}", self.pos) }
  }

  fn type_error(&self, detail: impl Into<String>) -> EvalError {
    EvalError::Type { expr: self.src.to_string(), detail: detail.into() }
  }

  fn expression(&mut self, ctx: &Value) -> Result<Value, EvalError> {
    self.equality(ctx)
  }

  fn equality(&mut self, ctx: &Value) -> Result<Value, EvalError> {
    let mut left = self.additive(ctx)?;
    loop {
      self.skip_ws();
      if self.eat("==") {
        let right = self.additive(ctx)?;
        left = Value::Bool(left == right);
      } else if self.eat("!=") {
        let right = self.additive(ctx)?;
        left = Value::Bool(left != right);
      } else {
        return Ok(left);
      }
    }
  }

  fn additive(&mut self, ctx: &Value) -> Result<Value, EvalError> {
    let mut left = self.unary(ctx)?;
    loop {
      self.skip_ws();
      if self.peek() == Some(b'+') {
        self.pos += 1;
        let right = self.unary(ctx)?;
        left = self.add(left, right)?;
      } else {
        return Ok(left);
      }
    }
  }

  fn add(&self, left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_string() || right.is_string() {
      return Ok(Value::String(format!("{}{}", stringify(&left), stringify(&right))));
    }
    match (left.as_i64(), right.as_i64()) {
      (Some(a), Some(b)) => Ok(Value::from(a + b)),
      _ => match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Value::from(a + b)),
        _ => Err(self.type_error("'+' requires numbers or strings")),
      },
    }
  }

  fn unary(&mut self, ctx: &Value) -> Result<Value, EvalError> {
    self.skip_ws();
    // '!' negation, but not the first half of '!='
    if self.peek() == Some(b'!') && self.bytes.get(self.pos + 1) != Some(&b'=') {
      self.pos += 1;
      let value = self.unary(ctx)?;
      return Ok(Value::Bool(!is_truthy(&value)));
    }
    self.primary(ctx)
  }

  fn primary(&mut self, ctx: &Value) -> Result<Value, EvalError> {
    self.skip_ws();
    match self.peek() {
      None => Err(self.syntax("expected expression")),
      Some(b'\'') | Some(b'"') => self.string_literal(),
      Some(c) if c.is_ascii_digit() => self.number_literal(),
      Some(c) if c == b'_' || c == b'$' || c.is_ascii_alphabetic() => self.path(ctx),
      Some(_) => Err(self.syntax("unexpected character")),
    }
  }

  fn string_literal(&mut self) -> Result<Value, EvalError> {
    let quote = self.bytes[self.pos];
    self.pos += 1;
    let start = self.pos;
    while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
      self.pos += 1;
    }
    if self.pos >= self.bytes.len() {
      return Err(self.syntax("unterminated string literal"));
    }
    let value = self.src[start..self.pos].to_string();
    self.pos += 1;
    Ok(Value::String(value))
  }

  fn number_literal(&mut self) -> Result<Value, EvalError> {
    let start = self.pos;
    while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
      self.pos += 1;
    }
    let mut float = false;
    if self.peek() == Some(b'.')
      && self.bytes.get(self.pos + 1).is_some_and(|b| b.is_ascii_digit())
    {
      float = true;
      self.pos += 1;
      while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
        self.pos += 1;
      }
    }
    let text = &self.src[start..self.pos];
    if float {
      text.parse::<f64>().map(Value::from).map_err(|_| self.syntax("invalid number"))
    } else {
      text.parse::<i64>().map(Value::from).map_err(|_| self.syntax("invalid number"))
    }
  }

  fn ident(&mut self) -> &'a str {
    let src = self.src;
    let start = self.pos;
    while self.pos < self.bytes.len() {
      let b = self.bytes[self.pos];
      if b == b'_' || b == b'$' || b.is_ascii_alphanumeric() {
        self.pos += 1;
      } else {
        break;
      }
    }
    &src[start..self.pos]
  }

  fn path(&mut self, ctx: &Value) -> Result<Value, EvalError> {
    let start = self.pos;
    let mut method: Option<&str> = None;
    loop {
      let segment = self.ident();
      if segment.is_empty() {
        return Err(self.syntax("expected identifier"));
      }
      if self.eat("()") {
        method = Some(segment);
        break;
      }
      // A dot continues the path only when an identifier follows;
      // `items.size()` consumes the dot, `2.5` never reaches here.
      if self.peek() == Some(b'.')
        && self.bytes.get(self.pos + 1).is_some_and(|b| {
          *b == b'_' || *b == b'$' || b.is_ascii_alphanumeric()
        })
      {
        self.pos += 1;
      } else {
        break;
      }
    }

    let full = &self.src[start..self.pos];
    if let Some(name) = method {
      let receiver_path = full[..full.len() - name.len() - 2].trim_end_matches('.');
      return self.call_method(name, receiver_path, ctx);
    }

    match full {
      "true" => Ok(Value::Bool(true)),
      "false" => Ok(Value::Bool(false)),
      "null" => Ok(Value::Null),
      path => Ok(resolve(path, ctx).cloned().unwrap_or(Value::Null)),
    }
  }

  fn call_method(&self, name: &str, receiver_path: &str, ctx: &Value) -> Result<Value, EvalError> {
    if receiver_path.is_empty() {
      return Err(self.syntax("method call without a receiver"));
    }
    let receiver = resolve(receiver_path, ctx).cloned().unwrap_or(Value::Null);
    match name {
      "size" | "length" => match &receiver {
        Value::Array(arr) => Ok(Value::from(arr.len())),
        Value::Object(map) => Ok(Value::from(map.len())),
        Value::String(s) => Ok(Value::from(s.chars().count())),
        Value::Null => Ok(Value::from(0)),
        _ => Err(self.type_error(format!("cannot take {name}() of a scalar"))),
      },
      other => Err(self.type_error(format!("unknown method '{other}()'"))),
    }
  }
}
