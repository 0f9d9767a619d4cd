use clap::Parser;
use ember::{
    ActivityRegistry, Reporter,
    cli::{Cli, Commands},
    log,
    pipeline::{self, PipelineOptions},
};
use ember_display::Display;
use miette::{IntoDiagnostic, Result};
use std::io;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.global_options.reporter_config(cli.command.context());
    if config.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let registry = ActivityRegistry::new();
    let display = Display::new(registry.subscribe()).colors(console::colors_enabled());
    let terminal = display.handle();

    // Logs share the terminal with the live panel.
    let log_terminal = terminal.clone();
    log::init_tracing(
        cli.global_options.level(),
        cli.global_options.log_format,
        move || log_terminal.writer_above(io::stderr()),
    );
    debug!(command = %config.command, "starting");

    // Flush the display before `panic`/`panic_on_build` end the process.
    let exit_terminal = terminal.clone();
    let reporter = Reporter::new(registry.clone(), config)
        .with_writer(terminal.writer_above(io::stderr()))
        .with_exit_hook(move |_code| {
            let _ = exit_terminal.finish();
        });
    let reporter = Arc::new(reporter);

    let (done_tx, done_rx) = oneshot::channel();
    let display_task = tokio::spawn(display.run(done_rx));

    match &cli.command {
        Commands::Build(args) | Commands::Develop(args) => {
            let summary = pipeline::run_pipeline(reporter.clone(), &PipelineOptions::from(args)).await;
            if !summary.failed.is_empty() {
                reporter.warn(format!(
                    "{} step(s) failed: {}",
                    summary.failed.len(),
                    summary.failed.join(", ")
                ));
            }
        }
        Commands::Panic { message } => reporter.panic(message, None),
    }

    let _ = done_tx.send(());
    display_task.await.into_diagnostic()?.into_diagnostic()?;
    Ok(())
}
