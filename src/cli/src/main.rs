/* src/cli/src/main.rs */

mod build;
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use weft_engine::Engine;
use weft_eval::PathEvaluator;
use weft_server::{IntoAxumRouter, PageDef, SiteServer};

#[derive(Parser)]
#[command(name = "weft", version, about = "Weft template engine")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Render every configured page to the output directory.
  Build {
    #[arg(long, default_value = "weft.toml")]
    config: PathBuf,
    /// Override the configured output directory.
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Render a single template to stdout.
  Render {
    /// Template path, relative to --root.
    template: String,
    /// JSON context file.
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    root: PathBuf,
  },
  /// Serve the configured site.
  Serve {
    #[arg(long, default_value = "weft.toml")]
    config: PathBuf,
    /// Override the configured listen address.
    #[arg(long)]
    addr: Option<String>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  match cli.command {
    Command::Build { config, out } => {
      let base_dir = config_base(&config);
      let site_config = config::load_config(&config)?;
      let count = build::run(&site_config, &base_dir, out.as_deref())?;
      log::info!("built {count} page(s)");
      Ok(())
    }
    Command::Render { template, data, root } => {
      let context = match data {
        Some(path) => {
          let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read data file '{}'", path.display()))?;
          serde_json::from_str(&raw)
            .with_context(|| format!("data file '{}' is not valid JSON", path.display()))?
        }
        None => serde_json::Value::Object(serde_json::Map::new()),
      };
      let evaluator = PathEvaluator::new();
      let engine = Engine::new(&root, &evaluator);
      let html = engine.render_path(&template, &context)?;
      #[allow(clippy::print_stdout)]
      {
        println!("{html}");
      }
      Ok(())
    }
    Command::Serve { config, addr } => {
      let base_dir = config_base(&config);
      let site_config = config::load_config(&config)?;
      let addr = addr.unwrap_or_else(|| site_config.site.addr.clone());

      let mut server = SiteServer::new(base_dir.join(&site_config.site.templates));
      for page in &site_config.pages {
        server = server.page(PageDef {
          route: page.route(),
          template: page.template.clone(),
          context: page.context(&base_dir)?,
        });
      }
      if let Some(assets) = &site_config.site.assets {
        server = server.static_assets(base_dir.join(assets));
      }

      server.serve(&addr).await.map_err(|e| anyhow::anyhow!("server failed: {e}"))
    }
  }
}

fn config_base(config: &Path) -> PathBuf {
  config.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new(".")).to_path_buf()
}
