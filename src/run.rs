use crate::accounting::{RunState, RunSummary};
use crate::compressor::Compressor;
use crate::config::Config;
use crate::error::{Result, ServiceErrorCategory, SqueezeError};
use crate::report::{Importance, Reporter};
use crate::service::CompressionService;
use crate::walker::TreeWalker;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Initializing,
    Walking,
    Reporting,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Initializing => "initializing",
            RunPhase::Walking => "walking",
            RunPhase::Reporting => "reporting",
            RunPhase::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Drives one invocation from credential check to final summary.
pub struct Runner<'a> {
    config: &'a Config,
    service: &'a dyn CompressionService,
    reporter: &'a dyn Reporter,
    phase: RunPhase,
}

impl<'a> Runner<'a> {
    pub fn new(
        config: &'a Config,
        service: &'a dyn CompressionService,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            config,
            service,
            reporter,
            phase: RunPhase::Initializing,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs every phase in order.
    ///
    /// Errors only come out of initialization; once walking starts, the run
    /// always reaches its summary.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut state = self.initialize()?;

        self.enter(RunPhase::Walking);
        self.reporter.info("Run started.", Importance::Normal);
        {
            let compressor = Compressor::new(self.service, self.reporter);
            let mut walker = TreeWalker::new(compressor, self.reporter);
            if let Err(err) = walker.walk(&self.config.root_directory, &mut state) {
                self.reporter.error(&err.to_string());
            }
        }
        state.finish();
        self.reporter.success("Run finished");

        self.enter(RunPhase::Reporting);
        let summary = state.summarize();
        self.report_summary(&summary);

        self.enter(RunPhase::Done);
        Ok(summary)
    }

    /// Validates the credential and reads the usage already consumed this
    /// period. Any failure here aborts the run before the tree is touched.
    fn initialize(&mut self) -> Result<RunState> {
        self.enter(RunPhase::Initializing);

        if let Err(err) = self.service.validate_credential() {
            return Err(match err.category {
                ServiceErrorCategory::Account => SqueezeError::CredentialRejected(err.message),
                _ => SqueezeError::Service(err),
            });
        }

        let quota_used_at_start = self.service.current_usage_count()?;

        self.reporter.info("Compressor ready", Importance::Low);
        self.reporter.info(
            &format!("ROOT DIRECTORY: {}", self.config.root_directory.display()),
            Importance::High,
        );
        self.reporter.info(
            &format!("COMPRESSIONS ALREADY USED THIS MONTH: {}", quota_used_at_start),
            Importance::High,
        );

        Ok(RunState::new(quota_used_at_start))
    }

    fn report_summary(&self, summary: &RunSummary) {
        self.reporter.blank_line(5);
        for line in summary.lines() {
            self.reporter.info(&format!("=== {}", line), Importance::High);
        }
    }

    fn enter(&mut self, phase: RunPhase) {
        crate::verbose!("Phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}
