//! Upload controller - the pipeline's state machine.
//!
//! ```text
//! Idle --pick--> Picking --chosen--> Validating --valid--> Uploading
//!   ^               |                    |                     |
//!   +--denied/cancel/failed-+---invalid--+-----success/failure-+
//! ```
//!
//! Each attempt runs to completion inside [`UploadController::request_pick`].
//! Every transition goes through the [`StateManager`], which broadcasts it to
//! observers; the controller itself never renders anything.

use crate::models::SessionState;
use crate::services::{
    Access, Delivery, DocumentUploader, FileSelector, PermissionGate, Platform, ProgressReporter,
    Selection, TypeRegistry, UploadError, ValidationResult, Validator,
};
use crate::state::{Notice, StateManager};
use std::sync::Arc;
use tokio::sync::mpsc;

/// How a pick request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptReport {
    Uploaded(Delivery),
    /// The user closed the picker; nothing was reported
    Cancelled,
    Failed(UploadError),
    /// Another attempt was still running; this request was ignored
    Busy,
}

pub struct UploadController {
    state: Arc<StateManager>,
    registry: Arc<TypeRegistry>,
    gate: PermissionGate,
    selector: FileSelector,
    validator: Validator,
    uploader: Arc<dyn DocumentUploader>,
    platform: Platform,
    max_size_bytes: u64,
}

impl UploadController {
    pub fn new(
        state: Arc<StateManager>,
        registry: Arc<TypeRegistry>,
        gate: PermissionGate,
        selector: FileSelector,
        uploader: Arc<dyn DocumentUploader>,
        max_size_bytes: u64,
    ) -> Self {
        Self {
            validator: Validator::new(Arc::clone(&registry)),
            state,
            registry,
            gate,
            selector,
            uploader,
            platform: Platform::current(),
            max_size_bytes,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn state_manager(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn phase(&self) -> SessionState {
        self.state.read(|s| s.phase)
    }

    /// Run one full attempt: permission, pick, validate, upload.
    ///
    /// Always leaves the controller `Idle` again, except for a `Busy`
    /// rejection, which leaves the running attempt untouched.
    pub async fn request_pick(&self) -> AttemptReport {
        if !self.state.try_begin_pick() {
            tracing::warn!("Pick requested while {}; ignoring", self.phase());
            return AttemptReport::Busy;
        }

        if self.gate.request_access(self.platform).await == Access::Denied {
            return self.fail(UploadError::PermissionDenied);
        }

        let allowed = self.registry.mime_types();
        let file = match self.selector.pick_file(&allowed).await {
            Ok(Selection::Chosen(file)) => file,
            Ok(Selection::Cancelled) => {
                self.state.finish(None);
                return AttemptReport::Cancelled;
            }
            Err(e) => return self.fail(e),
        };

        self.state.begin_validation(file.clone());

        if let ValidationResult::Invalid(e) = self.validator.validate(&file, self.max_size_bytes) {
            tracing::info!("Rejected {} before upload: {}", file.name, e);
            return self.fail(e);
        }

        self.state.begin_upload();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = {
            let upload = self.uploader.upload(&file, ProgressReporter::new(tx));
            tokio::pin!(upload);

            // `biased` polls progress first so a report is never overtaken
            // by the outcome.
            loop {
                tokio::select! {
                    biased;
                    Some(percent) = rx.recv() => {
                        self.state.record_progress(percent);
                    }
                    outcome = &mut upload => break outcome,
                }
            }
        };
        while let Ok(percent) = rx.try_recv() {
            self.state.record_progress(percent);
        }

        match outcome.into_result() {
            Ok(delivery) => {
                tracing::info!("Delivered {} (message {:?})", file.name, delivery.message_id);
                self.state.finish(Some(Notice::Uploaded {
                    file,
                    delivery: delivery.clone(),
                }));
                AttemptReport::Uploaded(delivery)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Run attempts back to back until `again` declines another one.
    ///
    /// `again` sees each finished attempt's report. Returns every report in
    /// order.
    pub async fn run_attempts<F, Fut>(&self, mut again: F) -> Vec<AttemptReport>
    where
        F: FnMut(&AttemptReport) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut reports = Vec::new();

        loop {
            let report = self.request_pick().await;
            let more = again(&report).await;
            reports.push(report);

            if !more {
                tracing::debug!("Session over after {} attempt(s)", reports.len());
                return reports;
            }
        }
    }

    fn fail(&self, error: UploadError) -> AttemptReport {
        tracing::warn!("Attempt failed: {}", error);
        self.state.finish(Some(Notice::Failed {
            error: error.clone(),
        }));
        AttemptReport::Failed(error)
    }
}
