/* src/server/src/lib.rs */

mod handler;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::handler::AppState;

/// A page served by the site: a route pattern, the template it renders,
/// and the context the render runs under. Templates are parsed fresh on
/// every request; no tree is shared between requests.
#[derive(Debug, Clone)]
pub struct PageDef {
  pub route: String,
  pub template: String,
  pub context: Value,
}

/// Builder for a template-backed site.
pub struct SiteServer {
  root_dir: PathBuf,
  pages: Vec<PageDef>,
  static_dir: Option<PathBuf>,
  static_prefix: String,
}

impl SiteServer {
  pub fn new(root_dir: impl Into<PathBuf>) -> Self {
    Self {
      root_dir: root_dir.into(),
      pages: Vec::new(),
      static_dir: None,
      static_prefix: "/static".to_string(),
    }
  }

  pub fn page(mut self, page: PageDef) -> Self {
    self.pages.push(page);
    self
  }

  /// Serve files from `dir` under the static prefix (default `/static`).
  pub fn static_assets(mut self, dir: impl Into<PathBuf>) -> Self {
    self.static_dir = Some(dir.into());
    self
  }

  pub fn static_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.static_prefix = prefix.into();
    self
  }
}

/// Extension trait that converts a `SiteServer` into an Axum router.
pub trait IntoAxumRouter {
  fn into_axum_router(self) -> axum::Router;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for SiteServer {
  fn into_axum_router(self) -> axum::Router {
    let mut router = axum::Router::new();
    let mut page_map = std::collections::HashMap::new();

    for page in self.pages {
      let route = page.route.clone();
      page_map.insert(route.clone(), Arc::new(page));
      router = router.route(&route, axum::routing::get(handler::handle_page));
    }

    if let Some(dir) = self.static_dir {
      router =
        router.nest_service(&self.static_prefix, tower_http::services::ServeDir::new(dir));
    }

    let state = Arc::new(AppState { root_dir: self.root_dir, pages: page_map });
    router.with_state(state)
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = self.into_axum_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("weft site running on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
  }
}
