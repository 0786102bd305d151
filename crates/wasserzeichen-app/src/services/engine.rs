// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine service — runs a session's effects and its export flow.
//
// Decoding and compositing are CPU-bound, so both run on tokio's blocking
// pool and are awaited before the session moves on. Pages are produced in
// order on that one blocking task.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use wasserzeichen_core::human_errors::humanize_error;
use wasserzeichen_core::{EmptyInput, EngineConfig, UploadedBuffer, WasserzeichenError};
use wasserzeichen_document::{Compositor, ExportOutcome, Normalized, Normalizer, export_document};
use wasserzeichen_export::{DeliveryReport, DownloadSink, SettingsStore, deliver, package};

use crate::session::{Action, Effect, Session};

/// Shared backend for every session.
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    normalizer: Normalizer,
    compositor: Arc<Compositor>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, WasserzeichenError> {
        Ok(Self {
            normalizer: Normalizer::new(config.clone()),
            compositor: Arc::new(Compositor::new(config.clone())?),
            config,
        })
    }

    /// Replace the normaliser (e.g. one backed by PDFium).
    #[cfg_attr(not(feature = "pdfium"), allow(dead_code))]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decode a buffer on the blocking pool.
    pub async fn normalize(&self, buffer: Arc<UploadedBuffer>) -> Result<Normalized, WasserzeichenError> {
        let normalizer = self.normalizer.clone();
        tokio::task::spawn_blocking(move || normalizer.normalize(&buffer))
            .await
            .map_err(join_err)?
    }

    /// Reduce `action` and carry out whatever it asks for.
    pub async fn dispatch(&self, session: &mut Session, action: Action) -> Result<(), WasserzeichenError> {
        let effect = session.reduce(action)?;
        self.run(session, effect).await
    }

    /// Carry out an effect. A load whose ticket went stale in the meantime
    /// surfaces as `StaleLoad` and leaves the session untouched.
    pub async fn run(&self, session: &mut Session, effect: Effect) -> Result<(), WasserzeichenError> {
        match effect {
            Effect::None => Ok(()),
            Effect::Load { ticket, buffer } => {
                let normalized = self.normalize(buffer).await?;
                if let Some(err) = &normalized.decode_error {
                    report(err, "document not fully decoded");
                }
                session.reduce(Action::Loaded { ticket, normalized })?;
                Ok(())
            }
        }
    }

    /// Export the current file: burn the watermark into every page of the
    /// session's page range that has pixels and deliver the results, or save
    /// the settings when none do. Pages outside the range are left out.
    ///
    /// Rejected before any work when there is no file, no text, or the style
    /// is locked without ever having been generated.
    #[instrument(skip_all, fields(session = %session.id()))]
    pub async fn export(
        &self,
        session: &Session,
        sink: &mut dyn DownloadSink,
        store: &dyn SettingsStore,
    ) -> Result<DeliveryReport, WasserzeichenError> {
        session.check_export()?;
        let no_file = || WasserzeichenError::EmptyInput(EmptyInput::NoFile);
        let document = session.document().cloned().ok_or_else(no_file)?;
        let ctx = session.persist_context().ok_or_else(no_file)?;
        let base_name = session.current_file().ok_or_else(no_file)?.buffer.name.clone();

        let spec = session.spec().clone();
        let range = session.page_range().clone();
        let compositor = Arc::clone(&self.compositor);
        let results =
            tokio::task::spawn_blocking(move || export_document(&document, &spec, &range, &compositor))
                .await
                .map_err(join_err)?;

        let mut outcomes: Vec<ExportOutcome> = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    report(&err, "page skipped");
                    first_error.get_or_insert(err);
                }
            }
        }
        // Every page failed: report it rather than silently saving settings.
        if outcomes.is_empty()
            && let Some(err) = first_error
        {
            return Err(err);
        }

        let plan = package(
            outcomes,
            &base_name,
            &ctx,
            Duration::from_millis(self.config.download_delay_ms),
        );
        let report = deliver(&plan, sink, store, &self.config).await?;
        info!(?report, "export finished");
        Ok(report)
    }
}

fn join_err(e: tokio::task::JoinError) -> WasserzeichenError {
    WasserzeichenError::Io(std::io::Error::other(e))
}

/// Log an error together with its user-facing wording.
pub fn report(err: &WasserzeichenError, context: &str) {
    let human = humanize_error(err);
    warn!(
        error = %err,
        message = %human.message,
        suggestion = %human.suggestion,
        retriable = human.retriable,
        "{context}"
    );
}
