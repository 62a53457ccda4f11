//! Sanitize-and-publish pipeline.

use std::time::Duration;

use web_time::Instant;

use crate::debounce::Debouncer;
use crate::preview::preview_document;
use crate::sanitize::sanitize;

/// The two published outputs of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    /// Trimmed sanitized inner markup, for copy and submission.
    pub fragment: String,
    /// Standalone document rendered by the live preview.
    pub preview: String,
}

#[derive(Debug, Clone)]
pub struct SyncPipeline {
    debouncer: Debouncer,
    artifacts: Artifacts,
    runs: u64,
}

impl SyncPipeline {
    pub fn new(quiet: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(quiet),
            artifacts: Artifacts::default(),
            runs: 0,
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Number of completed runs.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// A content change happened; run once things go quiet.
    pub fn schedule(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// Run now if a scheduled run is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant, surface_markup: impl FnOnce() -> String) -> bool {
        if self.debouncer.poll(now) {
            self.run(&surface_markup());
            true
        } else {
            false
        }
    }

    /// Run immediately, superseding any pending run.
    pub fn sync_now(&mut self, surface_markup: &str) -> &Artifacts {
        self.debouncer.cancel();
        self.run(surface_markup);
        &self.artifacts
    }

    fn run(&mut self, surface_markup: &str) {
        let sanitized = sanitize(surface_markup);
        self.artifacts = Artifacts {
            fragment: sanitized.trim().to_string(),
            preview: preview_document(&sanitized),
        };
        self.runs += 1;
        tracing::debug!(
            target: "consent_editor::sync",
            run = self.runs,
            bytes = self.artifacts.fragment.len(),
            "synced"
        );
    }
}
