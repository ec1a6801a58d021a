//! # Ad Canvas CLI
//!
//! Renders AI layout documents to PNG, validates them against platform
//! rules and checks headline copy.
//!
//! ## Usage
//!
//! ```bash
//! adcanvas render --design campaign.json --format story --output story.png
//! adcanvas validate --design campaign.json --size 1080x1920 --json
//! adcanvas check-copy "Save £5 now!" --all
//! ```
//!
//! Without `--design` (or `ADCANVAS_DESIGN`) the built-in fallback campaign
//! is used.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;

pub use commands::{check_copy, render, validate};

use std::path::PathBuf;
use std::time::Duration;

use adcanvas_core::{LayoutFormat, Platform};
use adcanvas_renderer::{DEFAULT_EXPORT_FILE, DEFAULT_EXPORT_QUALITY, DEFAULT_FETCH_TIMEOUT_SECS};
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for adcanvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "adcanvas")]
#[command(about = "Render and validate AI-generated ad layouts")]
#[command(version)]
pub struct CliArgs {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a layout and export it as an image.
    Render(RenderArgs),
    /// Render a layout and report platform rule violations.
    Validate(ValidateArgs),
    /// Check headline or subhead copy against retail copy rules.
    CheckCopy(CopyArgs),
}

/// Which design to load and which canvas to render it on.
#[derive(Debug, Clone, Args)]
pub struct DesignArgs {
    /// AI response JSON with story, post and banner layouts.
    #[arg(long, env = "ADCANVAS_DESIGN")]
    pub design: Option<PathBuf>,

    /// Output format (story, post or banner).
    #[arg(long, value_parser = parse_format, conflicts_with = "size")]
    pub format: Option<LayoutFormat>,

    /// Canvas size as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Timeout for fetching each remote image, in seconds.
    #[arg(long, env = "ADCANVAS_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,
}

impl DesignArgs {
    /// Canvas size to render at; the story size when unspecified.
    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        self.size
            .or_else(|| self.format.map(LayoutFormat::dimensions))
            .unwrap_or_else(|| LayoutFormat::Story.dimensions())
    }

    /// Image fetch timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Design selection.
    #[command(flatten)]
    pub design: DesignArgs,

    /// Output file; the extension picks PNG, JPEG or SVG.
    #[arg(long, short, default_value = DEFAULT_EXPORT_FILE)]
    pub output: PathBuf,

    /// Export quality factor (pixels per logical unit).
    #[arg(long, env = "ADCANVAS_QUALITY", default_value_t = DEFAULT_EXPORT_QUALITY)]
    pub quality: f64,

    /// Write the rendered scene as JSON to this file.
    #[arg(long)]
    pub scene_json: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Design selection.
    #[command(flatten)]
    pub design: DesignArgs,

    /// Platform whose rules apply (social, instagram_post or facebook_ad).
    #[arg(long, value_parser = parse_platform, default_value = "social")]
    pub platform: Platform,

    /// Print violations as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `check-copy`.
#[derive(Debug, Clone, Args)]
pub struct CopyArgs {
    /// Copy to check.
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Report every broken rule, not just the first.
    #[arg(long)]
    pub all: bool,

    /// Print violations as JSON.
    #[arg(long)]
    pub json: bool,
}

fn parse_format(value: &str) -> Result<LayoutFormat, String> {
    LayoutFormat::parse(value).ok_or_else(|| format!("unknown format '{value}'"))
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    Platform::parse(value).ok_or_else(|| format!("unknown platform '{value}'"))
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid dimension '{s}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let args = CliArgs::try_parse_from(["adcanvas", "render"]).expect("parse");
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.output, PathBuf::from(DEFAULT_EXPORT_FILE));
        assert!((render.quality - DEFAULT_EXPORT_QUALITY).abs() < f64::EPSILON);
        assert_eq!(render.design.canvas_size(), (1080, 1920));
    }

    #[test]
    fn test_format_and_size() {
        let args = CliArgs::try_parse_from(["adcanvas", "render", "--format", "banner"])
            .expect("parse");
        let Command::Render(render) = args.command else {
            panic!("expected render");
        };
        assert_eq!(render.design.canvas_size(), (1200, 628));

        let args = CliArgs::try_parse_from(["adcanvas", "validate", "--size", "1080x1080"])
            .expect("parse");
        let Command::Validate(validate) = args.command else {
            panic!("expected validate");
        };
        assert_eq!(validate.design.canvas_size(), (1080, 1080));
        assert_eq!(validate.platform, Platform::Social);

        assert!(CliArgs::try_parse_from([
            "adcanvas", "render", "--format", "post", "--size", "10x10"
        ])
        .is_err());
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_size("1200X628"), Ok((1200, 628)));
        assert!(parse_size("1200").is_err());
        assert!(parse_size("0x10").is_err());
        assert_eq!(parse_platform("facebook_ad"), Ok(Platform::FacebookAd));
        assert!(parse_format("square").is_err());
    }

    #[test]
    fn test_check_copy_requires_text() {
        assert!(CliArgs::try_parse_from(["adcanvas", "check-copy"]).is_err());
        let args = CliArgs::try_parse_from(["adcanvas", "check-copy", "Hurry", "in", "--all"])
            .expect("parse");
        let Command::CheckCopy(copy) = args.command else {
            panic!("expected check-copy");
        };
        assert_eq!(copy.text, vec!["Hurry", "in"]);
        assert!(copy.all);
    }
}
