/* src/cli/src/build.rs */

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use weft_engine::Engine;
use weft_eval::PathEvaluator;

use crate::config::WeftConfig;

/// Render every configured page and write `<name>.html` into the output
/// directory, overwriting existing files.
pub fn run(config: &WeftConfig, base_dir: &Path, out_override: Option<&Path>) -> Result<usize> {
  let templates_dir = base_dir.join(&config.site.templates);
  let out_dir =
    out_override.map(Path::to_path_buf).unwrap_or_else(|| base_dir.join(&config.site.out));
  fs::create_dir_all(&out_dir)
    .with_context(|| format!("cannot create output directory '{}'", out_dir.display()))?;

  let evaluator = PathEvaluator::new();
  let engine = Engine::new(&templates_dir, &evaluator);

  for page in &config.pages {
    let context = page.context(base_dir)?;
    let html = engine
      .render_path(&page.template, &context)
      .with_context(|| format!("rendering page '{}'", page.name))?;
    let target = out_dir.join(format!("{}.html", page.name));
    fs::write(&target, html)
      .with_context(|| format!("cannot write '{}'", target.display()))?;
    info!("wrote {}", target.display());
  }

  Ok(config.pages.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::load_config;

  fn site(dir: &Path) -> WeftConfig {
    fs::create_dir_all(dir.join("templates")).expect("templates dir");
    fs::write(
      dir.join("templates/hello.xml"),
      r#"<x-p class="greet" x-text="'Hello ' + name"></x-p>"#,
    )
    .expect("template");
    fs::write(
      dir.join("weft.toml"),
      r#"
[site]

[[pages]]
name = "hello"
template = "hello.xml"

[pages.data]
name = "Weft"
"#,
    )
    .expect("config");
    load_config(&dir.join("weft.toml")).expect("config should load")
  }

  #[test]
  fn build_writes_rendered_pages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = site(dir.path());

    let count = run(&config, dir.path(), None).expect("build should succeed");
    assert_eq!(count, 1);

    let html = fs::read_to_string(dir.path().join("dist/hello.html")).expect("output exists");
    assert_eq!(html, "<p class=\"greet\">Hello Weft</p>");
  }

  #[test]
  fn build_overwrites_existing_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = site(dir.path());

    fs::create_dir_all(dir.path().join("dist")).expect("dist dir");
    fs::write(dir.path().join("dist/hello.html"), "stale").expect("stale file");

    run(&config, dir.path(), None).expect("build should succeed");
    let html = fs::read_to_string(dir.path().join("dist/hello.html")).expect("output exists");
    assert_ne!(html, "stale");
  }

  #[test]
  fn build_honors_out_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = site(dir.path());

    let out = dir.path().join("elsewhere");
    run(&config, dir.path(), Some(&out)).expect("build should succeed");
    assert!(out.join("hello.html").exists());
  }

  #[test]
  fn broken_page_aborts_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = site(dir.path());
    fs::write(dir.path().join("templates/broken.xml"), "<div><span></div>").expect("template");
    config.pages[0].template = "broken.xml".to_string();

    assert!(run(&config, dir.path(), None).is_err());
  }
}
