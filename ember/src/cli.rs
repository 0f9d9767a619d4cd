//! Command line interface for the ember binary.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::config::{EXECUTING_COMMAND_ENV, LOG_LEVEL_ENV, ReporterConfig, is_verbose_level};
use crate::log::{Level, LogFormat};
use crate::pipeline::PipelineOptions;
use crate::policy::CommandContext;

#[derive(Debug, Parser)]
#[command(
    name = "ember",
    version,
    about = "Run build steps with live progress reporting"
)]
pub struct Cli {
    #[command(flatten)]
    pub global_options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Args)]
pub struct GlobalOptions {
    #[arg(short, long, global = true, help = "Enable additional debug logs.")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Silence all logs"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        help = "Disable colours in the display and in error output."
    )]
    pub no_color: bool,

    #[arg(
        long,
        global = true,
        help = "Configure the output format of the logs.",
        default_value_t,
        value_enum
    )]
    pub log_format: LogFormat,

    #[arg(long, global = true, env = LOG_LEVEL_ENV, hide = true)]
    pub log_level: Option<String>,

    #[arg(
        long = "command",
        global = true,
        env = EXECUTING_COMMAND_ENV,
        value_name = "COMMAND",
        help = "Command context deciding whether build errors abort (defaults to the subcommand)."
    )]
    pub command_context: Option<CommandContext>,
}

impl GlobalOptions {
    pub fn level(&self) -> Level {
        if self.quiet {
            Level::Silent
        } else if self.verbose {
            Level::Debug
        } else {
            Level::Info
        }
    }

    /// Verbose reporter output, from `--verbose` or `EMBER_LOG_LEVEL=verbose`.
    pub fn reporter_verbose(&self) -> bool {
        self.verbose || self.log_level.as_deref().is_some_and(is_verbose_level)
    }

    pub fn reporter_config(&self, subcommand: CommandContext) -> ReporterConfig {
        ReporterConfig {
            verbose: self.reporter_verbose(),
            no_color: self.no_color,
            command: self.command_context.clone().unwrap_or(subcommand),
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the build steps; a failing step aborts the command.")]
    Build(PipelineArgs),

    #[command(about = "Run the build steps in development mode; failing steps are reported and the run continues.")]
    Develop(PipelineArgs),

    #[command(about = "Report a fatal error and exit with status 1.")]
    Panic {
        #[arg(default_value = "unrecoverable error")]
        message: String,
    },
}

impl Commands {
    pub fn context(&self) -> CommandContext {
        match self {
            Commands::Build(_) => CommandContext::Build,
            Commands::Develop(_) => CommandContext::Develop,
            Commands::Panic { .. } => CommandContext::Other("panic".to_string()),
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct PipelineArgs {
    #[arg(long, default_value_t = 4, help = "Number of build steps to run.")]
    pub steps: usize,

    #[arg(
        long,
        default_value_t = 300,
        value_name = "MS",
        help = "Simulated duration of each step phase in milliseconds."
    )]
    pub phase_ms: u64,

    #[arg(long, help = "Make the last step fail.")]
    pub fail: bool,
}

impl From<&PipelineArgs> for PipelineOptions {
    fn from(args: &PipelineArgs) -> Self {
        PipelineOptions {
            steps: args.steps,
            phase_duration: Duration::from_millis(args.phase_ms),
            fail_last: args.fail,
        }
    }
}
