//! Sprig viewer - opens an XML widget document in a window
//!
//! Usage: sprig [OPTIONS] <document.xml>
//! `--render out.png` draws one frame without a window, `--layout-log`
//! prints the resolved layout.

use anyhow::{anyhow, Context, Result};
use log::info;
use sprig::app::App;
use sprig::config::{Config, ConfigError, USAGE};
use sprig::{layout, parser, Window};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let doc = parser::load(&config.document, &config.font)
        .with_context(|| format!("Failed to load {}", config.document.display()))?;

    if config.layout_log {
        let start = doc.window().unwrap_or(doc.root());
        layout::print_report(&doc, start);
        return Ok(());
    }

    let options = config.window_options(&doc);

    if let Some(out) = &config.render {
        return render_to_file(doc, options.width, options.height, out);
    }

    Window::new(doc, options).show().context("Failed to open window")?;
    Ok(())
}

/// Renders a single frame headless and writes it as PNG.
fn render_to_file(doc: sprig::Document, width: u32, height: u32, out: &Path) -> Result<()> {
    let mut app = App::new(doc, width, height);
    let frame = app.tick();
    if frame.dirty.is_none() {
        return Err(anyhow!("Nothing to render at {}x{}", width, height));
    }
    app.canvas()
        .save_png(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Rendered {}x{} to {}", width, height, out.display());
    Ok(())
}
