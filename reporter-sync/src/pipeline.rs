//! Report pipeline entrypoint used by the CLI.
//!
//! One run walks these stages in order:
//!
//! ```text
//! detecting -> done                       (nothing new)
//! detecting -> syncing -> running -> rendering -> publishing -> resyncing -> done
//! ```
//!
//! Running, rendering and publishing repeat per selected report. There is no
//! retry and no rollback; the first error ends the run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use reporter_core::{
    process::program_name, ArtifactChain, Filename, ReporterConfig, SelectionPolicy, Stage,
    ToolRunner,
};
use reporter_renderer::{html, notebook};

use crate::error::{check_status, SyncError};
use crate::{diff, listing, remote};

/// Remote and local listings plus the names only the remote has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub remote: Vec<Filename>,
    pub local: Vec<Filename>,
    pub new_files: Vec<Filename>,
}

impl Detection {
    pub fn is_synced(&self) -> bool {
        self.new_files.is_empty()
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub new_files: Vec<Filename>,
    pub reports: Vec<ArtifactChain>,
    /// Every stage entered, in order.
    pub stages: Vec<Stage>,
}

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing new on the remote; no mutating call was made.
    UpToDate,
    /// Dry run: these reports would have been produced.
    Planned {
        new_files: Vec<Filename>,
        reports: Vec<ArtifactChain>,
    },
    Processed(RunSummary),
}

/// Sequences listing, sync, notebook execution, rendering and publishing.
pub struct Pipeline<'a> {
    config: &'a ReporterConfig,
    runner: &'a dyn ToolRunner,
    selection: SelectionPolicy,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ReporterConfig, runner: &'a dyn ToolRunner) -> Self {
        Self {
            config,
            runner,
            selection: config.selection,
            dry_run: false,
        }
    }

    /// Override the configured selection policy for this run.
    pub fn selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Detect and plan only; spawn nothing that mutates either folder.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// List both folders and compute the new files. Read-only.
    pub fn detect(&self) -> Result<Detection, SyncError> {
        let remote = listing::list_remote(self.runner, self.config)?;
        tracing::info!("remote files: [{}]", joined(&remote));
        let local = listing::list_local(&self.config.local_folder)?;
        tracing::info!("local files: [{}]", joined(&local));
        let new_files = diff::new_files(&remote, &local);
        Ok(Detection {
            remote,
            local,
            new_files,
        })
    }

    /// Execute one full run.
    pub fn run(&self) -> Result<RunOutcome, SyncError> {
        let started_at = Utc::now();
        let mut stages = Vec::new();

        enter(&mut stages, Stage::Detecting);
        let detection = self.detect()?;
        if detection.is_synced() {
            tracing::info!("Everything is synced. No new files.");
            enter(&mut stages, Stage::Done);
            return Ok(RunOutcome::UpToDate);
        }
        tracing::info!("There are files missing: [{}]", joined(&detection.new_files));

        let reports: Vec<ArtifactChain> = self
            .selection
            .select(&detection.new_files)
            .iter()
            .map(|name| ArtifactChain::derive(name, self.config.naming, &self.config.work_dir))
            .collect();

        if self.dry_run {
            for chain in &reports {
                tracing::info!(
                    "[dry-run] would process {} -> {}",
                    chain.input,
                    chain.html.display()
                );
            }
            return Ok(RunOutcome::Planned {
                new_files: detection.new_files,
                reports,
            });
        }

        enter(&mut stages, Stage::Syncing);
        self.sync(Stage::Syncing)?;

        for chain in &reports {
            enter(&mut stages, Stage::Running);
            notebook::run_report(
                self.runner,
                &self.config.tools,
                &self.config.template_path,
                chain,
            )?;

            enter(&mut stages, Stage::Rendering);
            let output = html::render_html(self.runner, &self.config.tools, chain)?;
            check_status(
                Stage::Rendering,
                program_name(&self.config.tools.jupyter),
                &output,
                self.config.exit_codes,
            )?;

            enter(&mut stages, Stage::Publishing);
            let output = remote::publish(self.runner, self.config, &chain.html)?;
            check_status(
                Stage::Publishing,
                program_name(&self.config.tools.rclone),
                &output,
                self.config.exit_codes,
            )?;
            if output.success() {
                tracing::info!("Report published: {}", chain.html.display());
            }
        }

        enter(&mut stages, Stage::Resyncing);
        self.sync(Stage::Resyncing)?;
        enter(&mut stages, Stage::Done);

        Ok(RunOutcome::Processed(RunSummary {
            started_at,
            finished_at: Utc::now(),
            new_files: detection.new_files,
            reports,
            stages,
        }))
    }

    fn sync(&self, stage: Stage) -> Result<(), SyncError> {
        let output = remote::sync_mirror(self.runner, self.config)?;
        check_status(
            stage,
            program_name(&self.config.tools.rclone),
            &output,
            self.config.exit_codes,
        )
    }
}

fn joined(names: &[Filename]) -> String {
    names
        .iter()
        .map(Filename::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    tracing::debug!("stage: {stage}");
    stages.push(stage);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;

    use reporter_core::{ExitCodePolicy, Invocation, NamingStrategy, ProcessError, ToolOutput};
    use reporter_renderer::RenderError;
    use tempfile::TempDir;

    use super::*;

    /// Scripted stand-in for rclone / papermill / jupyter.
    ///
    /// Keys are `"<program> <first arg>"` for rclone and jupyter, the bare
    /// program name for papermill.
    #[derive(Default)]
    struct FakeRunner {
        remote_listing: String,
        codes: HashMap<&'static str, i32>,
        calls: RefCell<Vec<Invocation>>,
    }

    impl FakeRunner {
        fn with_remote(listing: &str) -> Self {
            Self {
                remote_listing: listing.to_string(),
                ..Self::default()
            }
        }

        fn failing(mut self, key: &'static str, code: i32) -> Self {
            self.codes.insert(key, code);
            self
        }

        fn keys(&self) -> Vec<String> {
            self.calls.borrow().iter().map(key_of).collect()
        }
    }

    fn key_of(invocation: &Invocation) -> String {
        let program = invocation.program_name();
        if program == "papermill" {
            return program;
        }
        let first = invocation.args_lossy().into_iter().next().unwrap_or_default();
        format!("{program} {first}")
    }

    impl ToolRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ProcessError> {
            self.calls.borrow_mut().push(invocation.clone());
            let key = key_of(invocation);
            let code = self.codes.get(key.as_str()).copied().unwrap_or(0);
            let stdout = if key == "rclone lsf" {
                self.remote_listing.clone()
            } else {
                String::new()
            };
            Ok(ToolOutput {
                code: Some(code),
                stdout,
                stderr: if code == 0 { String::new() } else { format!("{key} broke") },
            })
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: ReporterConfig,
    }

    fn fixture(local: &[&str]) -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let mirror = dir.path().join("mirror");
        fs::create_dir_all(&mirror).expect("mkdir mirror");
        for name in local {
            fs::write(mirror.join(name), "").expect("write local file");
        }
        let template = dir.path().join("template_notebook.ipynb");
        fs::write(&template, "{}").expect("write template");

        let mut config = ReporterConfig::new("reports", mirror, template);
        config.work_dir = dir.path().join("out");
        Fixture { _dir: dir, config }
    }

    fn strict_fixture() -> Fixture {
        let mut fx = fixture(&[]);
        fx.config.exit_codes = ExitCodePolicy::Strict;
        fx
    }

    /// Wraps a runner and fails the second `rclone sync`.
    struct ResyncFails(FakeRunner);

    impl ToolRunner for ResyncFails {
        fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ProcessError> {
            let mut output = self.0.run(invocation)?;
            let syncs = self.0.keys().iter().filter(|k| *k == "rclone sync").count();
            if key_of(invocation) == "rclone sync" && syncs == 2 {
                output.code = Some(5);
            }
            Ok(output)
        }
    }

    const FULL_RUN: &[&str] = &[
        "rclone lsf",
        "rclone sync",
        "papermill",
        "jupyter nbconvert",
        "rclone copy",
        "rclone sync",
    ];

    #[test]
    fn up_to_date_makes_no_mutating_calls() {
        let fx = fixture(&["a.xlsx", "b.xlsx"]);
        let runner = FakeRunner::with_remote("a.xlsx\nb.xlsx\n");

        let pipeline = Pipeline::new(&fx.config, &runner);
        assert_eq!(pipeline.run().expect("first run"), RunOutcome::UpToDate);
        assert_eq!(pipeline.run().expect("second run"), RunOutcome::UpToDate);

        assert_eq!(runner.keys(), vec!["rclone lsf", "rclone lsf"]);
    }

    #[test]
    fn processes_first_new_file_end_to_end() {
        let fx = fixture(&["a.xlsx"]);
        let runner = FakeRunner::with_remote("c.xlsx\na.xlsx\nb.xlsx\n");

        let outcome = Pipeline::new(&fx.config, &runner).run().expect("run");

        let RunOutcome::Processed(summary) = outcome else {
            panic!("expected processed outcome");
        };
        assert_eq!(
            summary.new_files,
            vec![Filename::from("b.xlsx"), Filename::from("c.xlsx")]
        );
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].input, Filename::from("b.xlsx"));
        assert_eq!(
            summary.stages,
            vec![
                Stage::Detecting,
                Stage::Syncing,
                Stage::Running,
                Stage::Rendering,
                Stage::Publishing,
                Stage::Resyncing,
                Stage::Done,
            ]
        );
        assert!(summary.finished_at >= summary.started_at);
        assert_eq!(runner.keys(), FULL_RUN);

        let calls = runner.calls.borrow();
        let html = fx.config.work_dir.join("b.html");
        assert_eq!(calls[4].args_lossy()[1], html.display().to_string());
    }

    #[test]
    fn selection_all_processes_every_new_file_then_resyncs_once() {
        let fx = fixture(&[]);
        let runner = FakeRunner::with_remote("b.xlsx\na.xlsx\n");

        let outcome = Pipeline::new(&fx.config, &runner)
            .selection(SelectionPolicy::All)
            .run()
            .expect("run");

        let RunOutcome::Processed(summary) = outcome else {
            panic!("expected processed outcome");
        };
        let inputs: Vec<_> = summary.reports.iter().map(|r| r.input.0.as_str()).collect();
        assert_eq!(inputs, vec!["a.xlsx", "b.xlsx"]);
        let keys = runner.keys();
        assert_eq!(keys.iter().filter(|k| *k == "papermill").count(), 2);
        assert_eq!(keys.iter().filter(|k| *k == "rclone sync").count(), 2);
    }

    #[test]
    fn default_naming_keeps_text_before_first_dot() {
        let fx = fixture(&[]);
        let runner = FakeRunner::with_remote("Q1.2024.xlsx\n");

        let RunOutcome::Processed(summary) = Pipeline::new(&fx.config, &runner).run().expect("run")
        else {
            panic!("expected processed outcome");
        };
        assert_eq!(summary.reports[0].base, "Q1");
        assert_eq!(summary.reports[0].notebook, fx.config.work_dir.join("Q1.ipynb"));
    }

    #[test]
    fn strip_extension_naming_keeps_inner_dots() {
        let mut fx = fixture(&[]);
        fx.config.naming = NamingStrategy::StripExtension;
        let runner = FakeRunner::with_remote("Q1.2024.xlsx\n");

        let RunOutcome::Processed(summary) = Pipeline::new(&fx.config, &runner).run().expect("run")
        else {
            panic!("expected processed outcome");
        };
        assert_eq!(summary.reports[0].html, fx.config.work_dir.join("Q1.2024.html"));
    }

    #[test]
    fn dry_run_plans_without_mutating() {
        let fx = fixture(&[]);
        let runner = FakeRunner::with_remote("report.xlsx\n");

        let outcome = Pipeline::new(&fx.config, &runner)
            .dry_run(true)
            .run()
            .expect("run");

        let RunOutcome::Planned { reports, .. } = outcome else {
            panic!("expected planned outcome");
        };
        assert_eq!(reports[0].html, fx.config.work_dir.join("report.html"));
        assert_eq!(runner.keys(), vec!["rclone lsf"]);
    }

    #[test]
    fn notebook_failure_stops_before_render() {
        let fx = fixture(&[]);
        let runner = FakeRunner::with_remote("report.xlsx\n").failing("papermill", 1);

        let err = Pipeline::new(&fx.config, &runner).run().unwrap_err();

        assert!(
            matches!(err, SyncError::Render(RenderError::ExecutionFailed { .. })),
            "got: {err}"
        );
        assert_eq!(err.stage(), Some(Stage::Running));
        assert_eq!(runner.keys(), vec!["rclone lsf", "rclone sync", "papermill"]);
        assert!(!fx.config.work_dir.join("report.html").exists());
    }

    #[test]
    fn notebook_failure_is_fatal_even_when_lenient() {
        let fx = fixture(&[]);
        assert_eq!(fx.config.exit_codes, ExitCodePolicy::Lenient);
        let runner = FakeRunner::with_remote("report.xlsx\n").failing("papermill", 1);

        assert!(Pipeline::new(&fx.config, &runner).run().is_err());
        assert!(!runner.keys().contains(&"jupyter nbconvert".to_string()));
    }

    #[test]
    fn strict_policy_aborts_on_failed_sync() {
        let fx = strict_fixture();
        let runner = FakeRunner::with_remote("report.xlsx\n").failing("rclone sync", 1);

        let err = Pipeline::new(&fx.config, &runner).run().unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Syncing));
        assert!(err.to_string().contains("rclone sync broke"));
        assert_eq!(runner.keys(), vec!["rclone lsf", "rclone sync"]);
    }

    #[test]
    fn strict_policy_aborts_on_failed_render() {
        let fx = strict_fixture();
        let runner = FakeRunner::with_remote("report.xlsx\n").failing("jupyter nbconvert", 1);

        let err = Pipeline::new(&fx.config, &runner).run().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Rendering));
        assert!(!runner.keys().contains(&"rclone copy".to_string()));
    }

    #[test]
    fn strict_policy_aborts_on_failed_publish_without_resync() {
        let fx = strict_fixture();
        let runner = FakeRunner::with_remote("report.xlsx\n").failing("rclone copy", 7);

        let err = Pipeline::new(&fx.config, &runner).run().unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Publishing));
        assert!(err.to_string().contains("exit code 7"), "got: {err}");
        assert_eq!(runner.keys(), &FULL_RUN[..5]);
    }

    #[test]
    fn strict_policy_reports_failed_resync() {
        let fx = strict_fixture();
        let runner = ResyncFails(FakeRunner::with_remote("report.xlsx\n"));

        let err = Pipeline::new(&fx.config, &runner).run().unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Resyncing));
        assert_eq!(runner.0.keys(), FULL_RUN);
    }

    #[test]
    fn lenient_publish_failure_still_resyncs() {
        let fx = fixture(&[]);
        let runner = FakeRunner::with_remote("report.xlsx\n").failing("rclone copy", 7);

        let outcome = Pipeline::new(&fx.config, &runner).run().expect("default policy is lenient");

        assert!(matches!(outcome, RunOutcome::Processed(_)));
        assert_eq!(runner.keys(), FULL_RUN);
    }

    #[test]
    fn lenient_policy_runs_through_failed_steps() {
        let fx = fixture(&[]);
        let runner = FakeRunner::with_remote("report.xlsx\n")
            .failing("rclone sync", 1)
            .failing("jupyter nbconvert", 2)
            .failing("rclone copy", 3);

        let outcome = Pipeline::new(&fx.config, &runner).run().expect("lenient run");

        assert!(matches!(outcome, RunOutcome::Processed(_)));
        assert_eq!(runner.keys(), FULL_RUN);
    }

    #[test]
    fn lenient_failed_listing_looks_synced() {
        let fx = fixture(&["a.xlsx"]);
        let runner = FakeRunner::with_remote("").failing("rclone lsf", 1);

        let outcome = Pipeline::new(&fx.config, &runner).run().expect("run");
        assert_eq!(outcome, RunOutcome::UpToDate);
    }

    #[test]
    fn detect_reports_both_listings() {
        let fx = fixture(&["a.xlsx", "a.html"]);
        let runner = FakeRunner::with_remote("a.xlsx\nb.xlsx\n");

        let detection = Pipeline::new(&fx.config, &runner).detect().expect("detect");

        assert_eq!(detection.local.len(), 2);
        assert_eq!(detection.new_files, vec![Filename::from("b.xlsx")]);
        assert!(!detection.is_synced());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(RunOutcome::UpToDate).expect("json");
        assert_eq!(json["outcome"], "up_to_date");
    }
}
