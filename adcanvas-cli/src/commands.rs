//! Subcommand implementations.

use std::io::Write;
use std::path::Path;

use adcanvas_core::{
    check_copy_all, AiResponse, CopyViolation, Editor, FormatRender, LayoutRenderer,
};
use adcanvas_renderer::{ExportConfig, ImageFetcher, LoaderConfig, SceneExporter};
use anyhow::{bail, Context};

use crate::{CopyArgs, DesignArgs, RenderArgs, ValidateArgs};

fn load_design(path: Option<&Path>) -> anyhow::Result<AiResponse> {
    let Some(path) = path else {
        tracing::info!("No design given, using the fallback campaign");
        return Ok(adcanvas_core::fallback_campaign());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read design {}", path.display()))?;
    AiResponse::from_json(&json).with_context(|| format!("Invalid design {}", path.display()))
}

/// Load the design and render the layout matching the requested canvas.
async fn render_design(args: &DesignArgs) -> anyhow::Result<(Editor<ImageFetcher>, FormatRender)> {
    let design = load_design(args.design.as_deref())?;
    let fetcher = ImageFetcher::with_config(LoaderConfig {
        timeout: args.fetch_timeout(),
        ..LoaderConfig::default()
    })?;

    let (width, height) = args.canvas_size();
    let mut editor = Editor::new(LayoutRenderer::new(fetcher), width, height).with_guides(false);
    let Some(rendered) = editor.set_design(Some(design)).await else {
        bail!("No layout matches a {width}x{height} canvas");
    };
    if rendered.report.failed_images > 0 {
        tracing::warn!(
            failed = rendered.report.failed_images,
            "Some images could not be loaded"
        );
    }
    Ok((editor, rendered))
}

/// Render a design and export it.
///
/// # Errors
///
/// Returns an error if the design cannot be loaded, no layout matches the
/// canvas, or the export fails.
pub async fn render(args: &RenderArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let (editor, rendered) = render_design(&args.design).await?;

    if let Some(path) = &args.scene_json {
        let json = editor.scene().to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write scene {}", path.display()))?;
    }

    let exporter = SceneExporter::new(ExportConfig {
        quality: args.quality,
        ..ExportConfig::default()
    });
    exporter
        .export_to_file(editor.scene(), &args.output)
        .with_context(|| format!("Failed to export {}", args.output.display()))?;

    let (width, height) = exporter.output_dimensions(editor.scene());
    writeln!(
        out,
        "Rendered {} layout ({} objects, {} skipped) to {} at {width}x{height}",
        rendered.format,
        rendered.report.added,
        rendered.report.skipped,
        args.output.display(),
    )?;
    Ok(())
}

/// Render a design and print its violations. Returns the violation count.
///
/// # Errors
///
/// Returns an error if the design cannot be rendered or output fails.
pub async fn validate(args: &ValidateArgs, out: &mut impl Write) -> anyhow::Result<usize> {
    let (mut editor, rendered) = render_design(&args.design).await?;
    let errors = editor.validate(args.platform);
    tracing::info!(
        format = %rendered.format,
        platform = ?args.platform,
        violations = errors.len(),
        "Validation finished"
    );

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&errors)?)?;
    } else if errors.is_empty() {
        writeln!(out, "{} layout passes {:?} rules", rendered.format, args.platform)?;
    } else {
        for error in &errors {
            match error.id {
                Some(id) => writeln!(out, "{id}: {}", error.message)?,
                None => writeln!(out, "canvas: {}", error.message)?,
            }
        }
    }
    Ok(errors.len())
}

/// Check copy and print the broken rules. Returns the violation count.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn check_copy(args: &CopyArgs, out: &mut impl Write) -> anyhow::Result<usize> {
    let text = args.text.join(" ");
    let violations: Vec<CopyViolation> = if args.all {
        check_copy_all(&text)
    } else {
        adcanvas_core::check_copy(&text).into_iter().collect()
    };

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&violations)?)?;
    } else if violations.is_empty() {
        writeln!(out, "Copy is compliant")?;
    } else {
        for violation in &violations {
            writeln!(out, "{:?}: {}", violation.category, violation.message)?;
        }
    }
    Ok(violations.len())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::{CliArgs, Command};

    fn parse(args: &[&str]) -> Command {
        CliArgs::try_parse_from(args).expect("parse").command
    }

    #[test]
    fn test_check_copy_output() {
        let Command::CheckCopy(args) =
            parse(&["adcanvas", "check-copy", "Save £5, shop now!", "--all"])
        else {
            panic!("expected check-copy");
        };
        let mut out = Vec::new();
        assert_eq!(check_copy(&args, &mut out).expect("check"), 2);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("Pricing: "));
        assert!(text.contains("CallToAction: "));
    }

    #[test]
    fn test_compliant_copy_json() {
        let Command::CheckCopy(args) = parse(&["adcanvas", "check-copy", "Fresh", "--json"]) else {
            panic!("expected check-copy");
        };
        let mut out = Vec::new();
        assert_eq!(check_copy(&args, &mut out).expect("check"), 0);
        assert_eq!(String::from_utf8(out).expect("utf8").trim(), "[]");
    }

    #[tokio::test]
    async fn test_render_design_file_to_svg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let design = dir.path().join("design.json");
        let layout = |w: u32, h: u32| {
            serde_json::json!({
                "width": w, "height": h, "backgroundColor": "#509E66",
                "elements": [{ "type": "text", "content": "STEP UP", "top": 100, "left": 40 }]
            })
        };
        let json = serde_json::json!({
            "instagram_story": layout(1080, 1920),
            "post": layout(1080, 1080),
            "banner": layout(1200, 628),
        });
        std::fs::write(&design, json.to_string()).expect("write design");

        let output = dir.path().join("post.svg");
        let Command::Render(args) = parse(&[
            "adcanvas",
            "render",
            "--design",
            design.to_str().expect("utf8 path"),
            "--format",
            "post",
            "--quality",
            "1",
            "--output",
            output.to_str().expect("utf8 path"),
        ]) else {
            panic!("expected render");
        };

        let mut out = Vec::new();
        render(&args, &mut out).await.expect("render");
        let svg = std::fs::read_to_string(&output).expect("svg written");
        assert!(svg.contains("STEP UP"));
        assert!(svg.contains("width=\"1080\" height=\"1080\""));
        assert!(String::from_utf8(out).expect("utf8").starts_with("Rendered post layout"));
    }

    #[tokio::test]
    async fn test_unmatched_size_is_an_error() {
        let Command::Validate(args) = parse(&["adcanvas", "validate", "--size", "640x480"]) else {
            panic!("expected validate");
        };
        let mut out = Vec::new();
        let err = validate(&args, &mut out).await.expect_err("no layout");
        assert!(err.to_string().contains("640x480"));
    }
}
