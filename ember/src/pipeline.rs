//! Simulated build steps driven through the reporter.
//!
//! Each step runs as its own task under a parent `build` activity, walks
//! through a few phases reported as status updates, and announces a success
//! when it finishes.

use miette::{Diagnostic, Report};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{Instrument, Span};

use crate::reporter::Reporter;
use crate::timer::ActivityArgs;

const STEP_NAMES: &[&str] = &[
    "load plugins",
    "compile",
    "bundle",
    "optimize images",
    "write pages",
];

const PHASES: &[&str] = &["preparing", "running", "finishing"];

#[derive(Debug, Clone, Error, Diagnostic)]
#[error("step `{step}` failed")]
#[diagnostic(
    code(ember::step_failed),
    help("run `ember develop` to keep going past failing steps")
)]
pub struct StepFailed {
    pub step: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub steps: usize,
    pub phase_duration: Duration,
    /// Make the last step fail during its second phase
    pub fail_last: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            steps: 4,
            phase_duration: Duration::from_millis(300),
            fail_last: false,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub completed: Vec<String>,
    pub failed: Vec<String>,
    /// Final string the overall `build` activity ended with
    pub overall: String,
}

pub fn step_name(index: usize) -> String {
    let base = STEP_NAMES[index % STEP_NAMES.len()];
    match index / STEP_NAMES.len() {
        0 => base.to_string(),
        round => format!("{base} #{}", round + 1),
    }
}

pub async fn run_pipeline(reporter: Arc<Reporter>, options: &PipelineOptions) -> PipelineSummary {
    reporter.uptime("pipeline start");

    let overall = reporter.activity_timer("build", ActivityArgs::default());
    overall.start();

    let mut tasks = JoinSet::new();
    for index in 0..options.steps {
        let reporter = reporter.clone();
        let parent = overall.span();
        let name = step_name(index);
        let fail = options.fail_last && index + 1 == options.steps;
        let phase_duration = options.phase_duration;

        tasks.spawn(async move { run_step(&reporter, name, &parent, phase_duration, fail).await });
    }

    let mut summary = PipelineSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(name)) => summary.completed.push(name),
            Ok(Err(failed)) => summary.failed.push(failed.step),
            Err(err) => reporter.error(format!("build step task did not finish: {err}")),
        }
    }
    summary.completed.sort();
    summary.failed.sort();

    overall.set_status(format!(
        "{} of {} steps",
        summary.completed.len(),
        options.steps
    ));
    summary.overall = overall.end();
    reporter.uptime("pipeline end");

    summary
}

async fn run_step(
    reporter: &Reporter,
    name: String,
    parent: &Span,
    phase_duration: Duration,
    fail: bool,
) -> Result<String, StepFailed> {
    let timer = reporter.activity_timer(name.clone(), ActivityArgs::child_of(parent));
    timer.start();

    for (index, phase) in PHASES.iter().enumerate() {
        timer.set_status(*phase);
        tokio::time::sleep(phase_duration)
            .instrument(timer.span())
            .await;

        if fail && index == 1 {
            timer.set_status("failed");
            timer.end();

            let error = StepFailed { step: name.clone() };
            reporter.panic_on_build(
                format!("{name} failed during {phase}"),
                Some(&Report::new(error.clone())),
            );
            return Err(error);
        }
    }

    reporter.verbose(indoc::formatdoc!(
        "
        {name} finished
          phases: {phases}",
        name = name,
        phases = PHASES.join(", "),
    ));
    timer.end();
    reporter.success(format!("{name} finished"));
    Ok(name)
}
