//! Command line configuration

use crate::dom::Document;
use crate::style::DEFAULT_FONT;
use crate::window::WindowOptions;
use std::path::PathBuf;

/// Environment variable naming the default font file
pub const FONT_ENV: &str = "SPRIG_FONT";

pub const USAGE: &str = "\
Usage: sprig [OPTIONS] <document.xml>

Options:
  --render <out.png>   Render one frame to a PNG file instead of opening a window
  --layout-log         Print the resolved layout of every node and exit
  --font <path>        Default font file (overrides SPRIG_FONT, else the bundled face)
  --title <title>      Window title (defaults to the window's name attribute)
  --resizable          Allow resizing the window
  --borderless         Open the window without decorations
  --maximized          Open the window maximized
  -h, --help           Show this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub document: PathBuf,
    pub render: Option<PathBuf>,
    pub layout_log: bool,
    pub font: String,
    pub title: Option<String>,
    pub resizable: bool,
    pub borderless: bool,
    pub maximized: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Help,
    MissingDocument,
    MissingValue(String),
    UnknownFlag(String),
    ExtraArgument(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Help => write!(f, "{}", USAGE),
            ConfigError::MissingDocument => write!(f, "No document given"),
            ConfigError::MissingValue(flag) => write!(f, "{} needs a value", flag),
            ConfigError::UnknownFlag(flag) => write!(f, "Unknown option {}", flag),
            ConfigError::ExtraArgument(arg) => write!(f, "Unexpected argument {}", arg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the process arguments and environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_args(std::env::args().skip(1), std::env::var(FONT_ENV).ok())
    }

    /// Parses arguments (without the program name). `env_font` is used when
    /// `--font` is absent.
    pub fn from_args<I>(args: I, env_font: Option<String>) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut document = None;
        let mut render = None;
        let mut layout_log = false;
        let mut font = None;
        let mut title = None;
        let mut resizable = false;
        let mut borderless = false;
        let mut maximized = false;

        while let Some(a) = args.next() {
            match a.as_str() {
                "-h" | "--help" => return Err(ConfigError::Help),
                "--layout-log" => layout_log = true,
                "--resizable" => resizable = true,
                "--borderless" => borderless = true,
                "--maximized" => maximized = true,
                "--render" => render = Some(PathBuf::from(value_of(&a, args.next())?)),
                "--font" => font = Some(value_of(&a, args.next())?),
                "--title" => title = Some(value_of(&a, args.next())?),
                flag if flag.starts_with("--") => return Err(ConfigError::UnknownFlag(flag.to_string())),
                path if document.is_none() => document = Some(PathBuf::from(path)),
                extra => return Err(ConfigError::ExtraArgument(extra.to_string())),
            }
        }

        Ok(Config {
            document: document.ok_or(ConfigError::MissingDocument)?,
            render,
            layout_log,
            font: font
                .or(env_font.filter(|f| !f.is_empty()))
                .unwrap_or_else(|| DEFAULT_FONT.to_string()),
            title,
            resizable,
            borderless,
            maximized,
        })
    }

    /// Window options from the flags, falling back to the root window's
    /// `name` and declared size.
    pub fn window_options(&self, doc: &Document) -> WindowOptions {
        let mut options = WindowOptions::new()
            .resizable(self.resizable)
            .borderless(self.borderless)
            .maximized(self.maximized);
        if let Some(win) = doc.window() {
            let node = doc.node(win);
            options = options
                .title(node.name.clone())
                .size(node.frame.width.max(0.0) as u32, node.frame.height.max(0.0) as u32);
        }
        if let Some(title) = &self.title {
            options = options.title(title.clone());
        }
        options
    }
}

fn value_of(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}
