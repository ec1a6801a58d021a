//! # Ad Canvas CLI
//!
//! Entry point for the `adcanvas` binary.

use std::process::ExitCode;

use adcanvas_cli::{CliArgs, Command};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing on stderr with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,adcanvas_core=debug,adcanvas_renderer=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adcanvas_core=debug,adcanvas_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = CliArgs::parse();
    let mut stdout = std::io::stdout().lock();

    let violations = match &args.command {
        Command::Render(render) => {
            adcanvas_cli::render(render, &mut stdout).await?;
            0
        }
        Command::Validate(validate) => adcanvas_cli::validate(validate, &mut stdout).await?,
        Command::CheckCopy(copy) => adcanvas_cli::check_copy(copy, &mut stdout)?,
    };

    Ok(if violations == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
