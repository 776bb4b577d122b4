/* src/cli/src/config.rs */

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct WeftConfig {
  pub site: SiteSection,
  #[serde(default)]
  pub pages: Vec<PageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
  /// Template root, relative to the config file.
  #[serde(default = "default_templates")]
  pub templates: String,
  /// Output directory for `weft build`.
  #[serde(default = "default_out")]
  pub out: String,
  /// Static asset directory served by `weft serve`.
  #[serde(default)]
  pub assets: Option<String>,
  #[serde(default = "default_addr")]
  pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
  /// Output file stem (`<name>.html`) and default route (`/<name>`).
  pub name: String,
  pub template: String,
  #[serde(default)]
  pub route: Option<String>,
  /// Inline context data; wins over `data_file` when both are present.
  #[serde(default)]
  pub data: Option<toml::Value>,
  /// Path to a JSON context file, relative to the config file.
  #[serde(default)]
  pub data_file: Option<String>,
}

impl PageEntry {
  pub fn route(&self) -> String {
    self.route.clone().unwrap_or_else(|| format!("/{}", self.name))
  }

  /// Resolve the render context for this page.
  pub fn context(&self, base_dir: &Path) -> Result<Value> {
    if let Some(data) = &self.data {
      return serde_json::to_value(data)
        .with_context(|| format!("inline data of page '{}' is not valid JSON", self.name));
    }
    if let Some(file) = &self.data_file {
      let path = base_dir.join(file);
      let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read data file '{}'", path.display()))?;
      return serde_json::from_str(&raw)
        .with_context(|| format!("data file '{}' is not valid JSON", path.display()));
    }
    Ok(Value::Object(serde_json::Map::new()))
  }
}

fn default_templates() -> String {
  "templates".to_string()
}

fn default_out() -> String {
  "dist".to_string()
}

fn default_addr() -> String {
  "127.0.0.1:8080".to_string()
}

/// Load a weft.toml site config.
pub fn load_config(path: &Path) -> Result<WeftConfig> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("cannot read config '{}'", path.display()))?;
  toml::from_str(&raw).with_context(|| format!("invalid config '{}'", path.display()))
}
