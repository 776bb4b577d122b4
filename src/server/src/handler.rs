/* src/server/src/handler.rs */

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{MatchedPath, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use log::error;
use weft_engine::Engine;
use weft_eval::PathEvaluator;

use crate::PageDef;

pub(crate) struct AppState {
  pub root_dir: PathBuf,
  pub pages: HashMap<String, Arc<PageDef>>,
}

pub(crate) async fn handle_page(
  State(state): State<Arc<AppState>>,
  matched: MatchedPath,
) -> Result<Html<String>, ServeError> {
  let page = state
    .pages
    .get(matched.as_str())
    .ok_or_else(|| ServeError::NotFound(matched.as_str().to_string()))?;

  let evaluator = PathEvaluator::new();
  let engine = Engine::new(&state.root_dir, &evaluator);
  let html = engine.render_path(&page.template, &page.context).map_err(|e| {
    error!("rendering '{}' failed: {e}", page.template);
    ServeError::Render(e.to_string())
  })?;
  Ok(Html(html))
}

pub(crate) enum ServeError {
  NotFound(String),
  Render(String),
}

impl IntoResponse for ServeError {
  fn into_response(self) -> Response {
    match self {
      ServeError::NotFound(route) => {
        (StatusCode::NOT_FOUND, format!("no page at {route}")).into_response()
      }
      ServeError::Render(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "template rendering failed".to_string())
          .into_response()
      }
    }
  }
}
