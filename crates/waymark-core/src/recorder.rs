//! Recorder state machine
//!
//! The recorder owns exactly one archive while running. Samples arrive on a
//! channel and are appended by a dedicated ingest task; stopping closes the
//! channel first and then awaits the ingest task, so no append can land after
//! the archive is finalized.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use waymark_api::{ArchiveMeta, PositionSample, RecorderState};
use waymark_config::RecorderSettings;
use waymark_source::{PositionSource, SubscribeOptions};
use waymark_store::{Archive, ArchiveNamer, ArchiveOpener};

use crate::{CoreResult, Notifier};

/// Start decision from the recorder
#[derive(Debug)]
pub enum StartOutcome {
    Started { archive_name: String, resumed: bool },
    AlreadyRunning,
}

/// Stop decision from the recorder
#[derive(Debug)]
pub enum StopOutcome {
    Stopped(StopSummary),
    NotRunning,
}

/// What a completed stop did
#[derive(Debug)]
pub struct StopSummary {
    pub archive_name: String,
    /// Samples persisted in the archive, cumulative across resumes
    pub count: u64,
    /// False when the session was empty and its archive was deleted
    pub kept: bool,
}

struct ActiveSession {
    archive: Arc<dyn Archive>,
    ingest: JoinHandle<u64>,
}

/// The recording session engine.
///
/// `start` and `stop` are idempotent: calling either in the matching state is
/// a no-op that leaves every collaborator untouched.
pub struct Recorder {
    settings: RecorderSettings,
    opener: Arc<dyn ArchiveOpener>,
    namer: ArchiveNamer,
    source: Arc<dyn PositionSource>,
    notifier: Arc<dyn Notifier>,
    session: Mutex<Option<ActiveSession>>,
}

impl Recorder {
    pub fn new(
        settings: RecorderSettings,
        opener: Arc<dyn ArchiveOpener>,
        namer: ArchiveNamer,
        source: Arc<dyn PositionSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            opener,
            namer,
            source,
            notifier,
            session: Mutex::new(None),
        }
    }

    /// Begin recording.
    ///
    /// Resumes the archive a prior session left open when the last-opened
    /// marker is present, otherwise mints a fresh archive. On failure the
    /// recorder stays stopped; a failure after the marker was written leaves
    /// the marker in place so a retry resumes the same archive.
    pub async fn start(&self) -> CoreResult<StartOutcome> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            debug!("Start requested but already recording");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let (name, resumed) = match self.namer.resumable_name() {
            Some(name) => (name, true),
            None => (self.namer.new_archive_name(), false),
        };

        let archive = self.opener.open(&name)?;

        if let Err(e) = self.namer.set_last_opened(&name) {
            let _ = archive.close();
            return Err(e.into());
        }

        // The session start time is the moment recording (re)started, not
        // the moment the archive was first created.
        if let Err(e) = archive.set_start_time(waymark_util::now()) {
            let _ = archive.close();
            return Err(e.into());
        }

        let options = SubscribeOptions {
            min_time: self.settings.min_update_time,
            min_distance: self.settings.min_update_distance,
        };
        let rx = match self.source.subscribe(options).await {
            Ok(rx) => rx,
            Err(e) => {
                // Keep the marker: the archive is now "interrupted" and a
                // retry picks it back up.
                let _ = archive.close();
                return Err(e.into());
            }
        };

        if resumed {
            self.notifier.notify(&format!("Resuming {name}"));
        }

        let ingest = spawn_ingest(rx, Arc::clone(&archive));
        *session = Some(ActiveSession { archive, ingest });

        info!(archive = %name, resumed, "Recording started");
        Ok(StartOutcome::Started {
            archive_name: name,
            resumed,
        })
    }

    /// Stop recording and finalize the session.
    ///
    /// Empty sessions are announced and their archive deleted; non-empty
    /// sessions get an end time and a recorded-count announcement. Either
    /// way the last-opened marker is cleared and the state is Stopped.
    pub async fn stop(&self) -> CoreResult<StopOutcome> {
        let mut session = self.session.lock().await;
        let Some(active) = session.take() else {
            debug!("Stop requested but not recording");
            return Ok(StopOutcome::NotRunning);
        };
        let ActiveSession { archive, ingest } = active;

        if let Err(e) = self.source.unsubscribe().await {
            warn!(error = %e, "Unsubscribe failed; finalizing session anyway");
        }

        // The channel is closed now; drain the ingest task before touching
        // the archive so the last samples are counted.
        let appended = match ingest.await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Ingest task did not finish cleanly");
                0
            }
        };

        let name = archive.name().to_string();
        let summary = match archive.meta() {
            Ok(meta) if meta.is_empty() => {
                self.notifier.notify("Nothing was recorded");
                if let Err(e) = archive.close() {
                    warn!(archive = %name, error = %e, "Close failed");
                }
                drop(archive);
                if let Err(e) = self.opener.delete(&name) {
                    warn!(archive = %name, error = %e, "Could not delete empty archive");
                }
                info!(archive = %name, "Recording stopped, empty session discarded");
                StopSummary {
                    archive_name: name,
                    count: 0,
                    kept: false,
                }
            }
            Ok(meta) => {
                let end = waymark_util::now();
                if let Err(e) = archive.set_end_time(end) {
                    warn!(archive = %name, error = %e, "Could not stamp end time");
                }
                self.notifier
                    .notify(&format!("Recorded {} points", meta.count));
                if let Err(e) = archive.close() {
                    warn!(archive = %name, error = %e, "Close failed");
                }
                let elapsed = meta
                    .start_time
                    .map(|s| end.signed_duration_since(s))
                    .and_then(|d| d.to_std().ok());
                match elapsed {
                    Some(d) => info!(
                        archive = %name,
                        count = meta.count,
                        duration = %waymark_util::format_duration(d),
                        "Recording stopped"
                    ),
                    None => info!(archive = %name, count = meta.count, "Recording stopped"),
                }
                StopSummary {
                    archive_name: name,
                    count: meta.count,
                    kept: true,
                }
            }
            Err(e) => {
                // Metadata is unreadable but the samples may well be fine;
                // keep the file for offline recovery.
                warn!(archive = %name, error = %e, "Could not read session metadata; keeping archive");
                if let Err(close_err) = archive.close() {
                    warn!(archive = %name, error = %close_err, "Close failed");
                }
                StopSummary {
                    archive_name: name,
                    count: appended,
                    kept: true,
                }
            }
        };

        if let Err(e) = self.namer.clear_last_opened() {
            warn!(error = %e, "Could not clear last-opened marker");
        }

        Ok(StopOutcome::Stopped(summary))
    }

    pub async fn state(&self) -> RecorderState {
        if self.session.lock().await.is_some() {
            RecorderState::Running
        } else {
            RecorderState::Stopped
        }
    }

    /// Metadata of the currently open archive, None when stopped
    pub async fn meta(&self) -> Option<ArchiveMeta> {
        let session = self.session.lock().await;
        let active = session.as_ref()?;
        match active.archive.meta() {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!(error = %e, "Could not read session metadata");
                None
            }
        }
    }

    /// Most recent persisted sample of the current session, None when stopped
    pub async fn last_record(&self) -> Option<PositionSample> {
        let session = self.session.lock().await;
        let active = session.as_ref()?;
        active.archive.last_sample().ok().flatten()
    }

    /// Handle to the currently open archive, None when stopped
    pub async fn archive(&self) -> Option<Arc<dyn Archive>> {
        let session = self.session.lock().await;
        session.as_ref().map(|a| Arc::clone(&a.archive))
    }

    /// Name of the currently open archive, None when stopped
    pub async fn archive_name(&self) -> Option<String> {
        let session = self.session.lock().await;
        session.as_ref().map(|a| a.archive.name().to_string())
    }

    /// Startup hook: honors the auto-start setting.
    pub async fn on_init(&self) {
        if self.settings.auto_start {
            info!("Auto-start enabled");
            if let Err(e) = self.start().await {
                warn!(error = %e, "Auto-start failed");
            }
        }
    }

    /// Shutdown hook: finalizes a running session so a clean daemon exit
    /// never leaves the marker behind.
    pub async fn on_shutdown(&self) {
        if let Err(e) = self.stop().await {
            warn!(error = %e, "Stop on shutdown failed");
        }
    }
}

fn spawn_ingest(
    mut rx: mpsc::UnboundedReceiver<PositionSample>,
    archive: Arc<dyn Archive>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut appended = 0u64;
        while let Some(sample) = rx.recv().await {
            match archive.append(&sample) {
                Ok(()) => appended += 1,
                Err(e) => warn!(error = %e, "Dropping sample, append failed"),
            }
        }
        debug!(appended, "Ingest finished");
        appended
    })
}
