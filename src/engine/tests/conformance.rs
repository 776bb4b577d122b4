/* src/engine/tests/conformance.rs */

// End-to-end fixture tests: parse documents from tests/fixtures and
// compare whole rendered strings.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use weft_engine::{Engine, EngineError};
use weft_eval::PathEvaluator;

fn fixtures() -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn render(path: &str, context: &Value) -> String {
  let evaluator = PathEvaluator::new();
  let engine = Engine::new(fixtures(), &evaluator);
  engine.render_path(path, context).expect("fixture should render")
}

fn todo_context() -> Value {
  json!({
    "page": {"title": "The best title"},
    "items": [
      {"id": "1", "title": "Read book", "done": true},
      {"id": 2, "title": "Make pancakes", "done": false}
    ]
  })
}

#[test]
fn template_tags_render_conditionals_and_text() {
  let out = render("template-tags.xml", &json!({"name": "Cassie", "visible": true, "over": false}));
  assert_eq!(
    out,
    "<p class=\"bg-dark\"><span class=\"title\">Cassie</span><i class=\"fa fa-check\"></i></p>"
  );
}

#[test]
fn template_tags_parse_to_three_children() {
  let evaluator = PathEvaluator::new();
  let engine = Engine::new(fixtures(), &evaluator);
  let root = engine.parse("template-tags.xml").expect("fixture should parse");
  assert_eq!(root.children.len(), 3);
}

#[test]
fn plain_tags_round_trip() {
  let out = render("plain-tags.xml", &json!({}));
  assert_eq!(out, "<p id=\"name\"><span class=\"title\">Jimmy</span><i class=\"fa fa-check\"></i></p>");
}

#[test]
fn text_expression_concatenation() {
  let out = render("greeting.xml", &json!({"name": "Jimbob"}));
  assert_eq!(out, "<p class=\"fa fa-memo\">My name is Jimbob</p>");
}

#[test]
fn include_inlines_without_wrapper() {
  let out = render("include-page.xml", &json!({"name": "Jimbob"}));
  assert_eq!(out, "<p class=\"me\"><p class=\"fa fa-memo\">My name is Jimbob</p></p>");
}

#[test]
fn todo_list_renders_items_and_count() {
  let out = render("todo-list.xml", &todo_context());
  assert_eq!(
    out,
    concat!(
      "<div id=\"todo-list\">",
      "<form onsubmit=\"add\"><label><input name=\"title\" onchange=\"edit\"/></label>",
      "<button type=\"submit\">Add</button></form>",
      "<ul>",
      "<li><i title=\"done\" class=\"fa fa-square\"></i><span>Read book</span>",
      "<i title=\"remove\" class=\"fa fa-times-circle\"></i></li>",
      "<li><i title=\"done\" class=\"fa fa-check-square\"></i><span>Make pancakes</span>",
      "<i title=\"remove\" class=\"fa fa-times-circle\"></i></li>",
      "</ul>",
      "<p>2</p>",
      "</div>"
    )
  );
}

#[test]
fn layout_renders_standalone_with_slot_defaults() {
  let out = render("layout-template.xml", &json!({}));
  assert_eq!(
    out,
    concat!(
      "<html lang=\"en\"><head>",
      "<meta charset=\"UTF-8\"/>",
      "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>",
      "<meta http-equiv=\"X-UA-Compatible\" content=\"ie=edge\"/>",
      "<title>Default Title</title>",
      "</head><body>",
      "<nav><menu><li>Login</li></menu></nav>",
      "<main></main>",
      "<footer><div><span class=\"sticky\">&copy; 2024 Weft</span></div></footer>",
      "<script src=\"special-sauce.js\" type=\"module\"></script>",
      "</body></html>"
    )
  );
}

#[test]
fn decorated_page_composes_into_layout() {
  let out = render("decorated-page.xml", &todo_context());
  assert_eq!(
    out,
    concat!(
      "<!doctype html>",
      "<html lang=\"en\"><head>",
      "<meta charset=\"UTF-8\"/>",
      "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>",
      "<meta http-equiv=\"X-UA-Compatible\" content=\"ie=edge\"/>",
      "<meta hobby=\"reading\"/>",
      "<link rel=\"stylesheet\" href=\"css/style.css\" type=\"text/css\"/>",
      "<title>The best title</title>",
      "<script defer=\"true\" src=\"/js/sauce.js\"></script>",
      "</head><body>",
      "<nav><menu><li>Login</li></menu></nav>",
      "<div id=\"todo-list\">",
      "<form onsubmit=\"add\"><label><input name=\"title\" onchange=\"edit\"/></label>",
      "<button type=\"submit\">Add</button></form>",
      "<ul>",
      "<li><i title=\"done\" class=\"fa fa-square\"></i><span>Read book</span>",
      "<i title=\"remove\" class=\"fa fa-times-circle\"></i></li>",
      "<li><i title=\"done\" class=\"fa fa-check-square\"></i><span>Make pancakes</span>",
      "<i title=\"remove\" class=\"fa fa-times-circle\"></i></li>",
      "</ul>",
      "<p>2</p>",
      "</div>",
      "<footer><div><span class=\"sticky\">&copy; 2024 Weft</span></div></footer>",
      "<script src=\"special-sauce.js\" type=\"module\"></script>",
      "</body></html>"
    )
  );
}

#[test]
fn decorated_page_drops_unmatched_children() {
  let out = render("decorated-page.xml", &todo_context());
  assert!(!out.contains("orphaned content"), "non-slot, non-decorator children must vanish");
  assert!(!out.contains("<aside"));
}

#[test]
fn basic_page_aggregates_decorators_in_contribution_order() {
  let out = render("basic-page.xml", &json!({"page": {"title": "The best title"}}));
  assert_eq!(
    out,
    concat!(
      "<!DOCTYPE html>",
      "<html lang=\"en\"><head>",
      "<meta charset=\"UTF-8\"/>",
      "<meta another=\"something\" hobby=\"programming\"/>",
      "<meta skylight=\"azure\" baseline=\"yellow\"/>",
      "<link rel=\"stylesheet\" href=\"css/reset.css\" type=\"text/css\"/>",
      "<link rel=\"stylesheet\" href=\"css/style.css\" type=\"text/css\"/>",
      "<title>The best title</title>",
      "<script defer=\"true\" src=\"/js/hot-sauce.js\"></script>",
      "<script defer=\"true\" src=\"/js/sweet-sauce.js\"></script>",
      "</head><body>",
      "<div>I'm here</div>",
      "</body></html>"
    )
  );
}

#[test]
fn slot_content_replaces_default_exactly_once() {
  let out = render("basic-page.xml", &json!({"page": {"title": "The best title"}}));
  assert!(!out.contains("Untitled"), "bound slot must suppress the layout default");
  assert_eq!(out.matches("I'm here").count(), 1);
}

#[test]
fn style_contribution_is_unsupported() {
  let evaluator = PathEvaluator::new();
  let engine = Engine::new(fixtures(), &evaluator);
  let err = engine.render_path("style-page.xml", &json!({})).expect_err("style must be rejected");
  assert!(matches!(err, EngineError::UnsupportedDecorator(tag) if tag == "x-style"));
}

#[test]
fn free_form_content_passes_through() {
  let out = render("free-form.xml", &json!({}));
  assert_eq!(
    out,
    concat!(
      "<head>",
      "<style type=\"text/css\">.main { background-color: blue; }</style>",
      "<script type=\"module\">console.log(\"ready\")</script>",
      "</head>"
    )
  );
}

#[test]
fn bound_slot_with_false_condition_renders_nothing() {
  let evaluator = PathEvaluator::new();
  let engine = Engine::new(fixtures(), &evaluator);
  let source = concat!(
    "<x-layout x-template=\"basic-layout.xml\">",
    "<x-title x-named=\"title\" x-if=\"show\" x-text=\"page.title\"></x-title>",
    "</x-layout>"
  );
  let root = weft_engine::parse_str(source, &evaluator).expect("page should parse");
  let out = engine.render(&root, &json!({"show": false, "page": {"title": "hidden"}})).expect("render");
  assert!(!out.contains("<title>"), "suppressed binding must not fall back to the default");
  assert!(!out.contains("Untitled"));
}

#[test]
fn missing_template_file_is_io_error() {
  let evaluator = PathEvaluator::new();
  let engine = Engine::new(fixtures(), &evaluator);
  let err = engine.render_path("nope.xml", &json!({})).expect_err("missing file");
  assert!(matches!(err, EngineError::Io { .. }));
}

#[test]
fn same_tree_renders_under_independent_contexts() {
  let evaluator = PathEvaluator::new();
  let engine = Engine::new(fixtures(), &evaluator);
  let root = engine.parse("greeting.xml").expect("fixture should parse");
  let first = engine.render(&root, &json!({"name": "Ada"})).expect("render");
  let second = engine.render(&root, &json!({"name": "Grace"})).expect("render");
  assert_eq!(first, "<p class=\"fa fa-memo\">My name is Ada</p>");
  assert_eq!(second, "<p class=\"fa fa-memo\">My name is Grace</p>");
}
