//! Integration tests for waymarkd
//!
//! These tests exercise the recorder against the real SQLite store on disk,
//! with a mock position source standing in for gpsd.

use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use waymark_api::{PositionSample, RecorderState};
use waymark_config::RecorderSettings;
use waymark_core::{Notifier, Recorder, RecordingNotifier, StartOutcome, StopOutcome};
use waymark_source::{MockPositionSource, PositionSource};
use waymark_store::{ArchiveNamer, ArchiveOpener, SqliteOpener};

struct Harness {
    recorder: Recorder,
    source: Arc<MockPositionSource>,
    notifier: Arc<RecordingNotifier>,
}

/// Build a recorder over a shared data directory, the way the daemon does,
/// but with a mock source. Each harness models one daemon process.
fn harness(data_dir: &Path) -> Harness {
    let source = Arc::new(MockPositionSource::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let recorder = Recorder::new(
        RecorderSettings::default(),
        Arc::new(SqliteOpener::new(data_dir)) as Arc<dyn ArchiveOpener>,
        ArchiveNamer::new(data_dir),
        Arc::clone(&source) as Arc<dyn PositionSource>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    Harness {
        recorder,
        source,
        notifier,
    }
}

fn sample(latitude: f64) -> PositionSample {
    PositionSample {
        altitude: Some(40.0),
        speed: Some(1.0),
        accuracy: Some(5.0),
        ..PositionSample::new(latitude, 13.0, Local::now())
    }
}

async fn wait_for_count(recorder: &Recorder, n: u64) {
    for _ in 0..200 {
        if recorder.meta().await.is_some_and(|m| m.count >= n) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {n} samples");
}

#[tokio::test]
async fn full_session_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let StartOutcome::Started {
        archive_name,
        resumed,
    } = h.recorder.start().await.unwrap()
    else {
        panic!("expected Started");
    };
    assert!(!resumed);
    assert_eq!(h.recorder.state().await, RecorderState::Running);

    h.source.emit(sample(52.0));
    h.source.emit(sample(52.001));
    h.source.emit(sample(52.002));
    wait_for_count(&h.recorder, 3).await;

    // Reads through the open handle see the running session
    let open = h.recorder.archive().await.unwrap();
    assert_eq!(open.last_sample().unwrap().unwrap().latitude, 52.002);
    assert_eq!(h.recorder.last_record().await.unwrap().latitude, 52.002);
    drop(open);

    let StopOutcome::Stopped(summary) = h.recorder.stop().await.unwrap() else {
        panic!("expected Stopped");
    };
    assert_eq!(summary.count, 3);
    assert!(summary.kept);
    assert_eq!(h.notifier.last().unwrap(), "Recorded 3 points");

    // The archive file is on disk; the resume marker is not
    assert!(dir.path().join(&archive_name).exists());
    assert!(!dir.path().join("last-opened").exists());

    // Reopen the file like an export tool would
    let opener = SqliteOpener::new(dir.path());
    let archive = opener.open(&archive_name).unwrap();
    let meta = archive.meta().unwrap();
    assert_eq!(meta.count, 3);
    assert!(meta.start_time.is_some());
    assert!(meta.end_time.is_some());

    let samples = archive.samples().unwrap();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].latitude, 52.0);
    assert_eq!(samples[2].latitude, 52.002);
}

#[tokio::test]
async fn interrupted_session_resumes_in_a_new_process() {
    let dir = tempfile::tempdir().unwrap();

    // First "process": record two points, then vanish without stopping
    let first = harness(dir.path());
    first.recorder.start().await.unwrap();
    first.source.emit(sample(52.0));
    first.source.emit(sample(52.001));
    wait_for_count(&first.recorder, 2).await;
    let name = first.recorder.archive_name().await.unwrap();
    drop(first);

    // Second "process": the marker survives, so start resumes the archive
    let second = harness(dir.path());
    let StartOutcome::Started {
        archive_name,
        resumed,
    } = second.recorder.start().await.unwrap()
    else {
        panic!("expected Started");
    };
    assert!(resumed);
    assert_eq!(archive_name, name);
    assert_eq!(
        second.notifier.last().unwrap(),
        format!("Resuming {name}")
    );

    second.source.emit(sample(52.002));
    wait_for_count(&second.recorder, 3).await;

    let StopOutcome::Stopped(summary) = second.recorder.stop().await.unwrap() else {
        panic!("expected Stopped");
    };
    assert_eq!(summary.count, 3);
    assert_eq!(second.notifier.last().unwrap(), "Recorded 3 points");
    assert!(!dir.path().join("last-opened").exists());
}

#[tokio::test]
async fn empty_session_leaves_no_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let StartOutcome::Started { archive_name, .. } = h.recorder.start().await.unwrap() else {
        panic!("expected Started");
    };
    assert!(dir.path().join(&archive_name).exists());

    let StopOutcome::Stopped(summary) = h.recorder.stop().await.unwrap() else {
        panic!("expected Stopped");
    };
    assert!(!summary.kept);
    assert_eq!(h.notifier.last().unwrap(), "Nothing was recorded");

    assert!(!dir.path().join(&archive_name).exists());
    assert!(!dir.path().join("last-opened").exists());
}

#[tokio::test]
async fn start_and_stop_are_idempotent_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    assert!(matches!(
        h.recorder.stop().await.unwrap(),
        StopOutcome::NotRunning
    ));

    h.recorder.start().await.unwrap();
    assert!(matches!(
        h.recorder.start().await.unwrap(),
        StartOutcome::AlreadyRunning
    ));
    assert_eq!(h.source.subscribe_count(), 1);

    h.source.emit(sample(52.0));
    wait_for_count(&h.recorder, 1).await;

    assert!(matches!(
        h.recorder.stop().await.unwrap(),
        StopOutcome::Stopped(_)
    ));
    assert!(matches!(
        h.recorder.stop().await.unwrap(),
        StopOutcome::NotRunning
    ));
    assert_eq!(h.source.unsubscribe_count(), 1);

    // Exactly one announcement for the one real session
    assert_eq!(h.notifier.messages(), vec!["Recorded 1 points"]);
}

#[tokio::test]
async fn back_to_back_sessions_use_distinct_archives() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let StartOutcome::Started { archive_name: a, .. } = h.recorder.start().await.unwrap() else {
        panic!("expected Started");
    };
    h.source.emit(sample(52.0));
    wait_for_count(&h.recorder, 1).await;
    h.recorder.stop().await.unwrap();

    let StartOutcome::Started {
        archive_name: b,
        resumed,
    } = h.recorder.start().await.unwrap()
    else {
        panic!("expected Started");
    };
    assert!(!resumed, "clean stop must not leave a resumable session");
    assert_ne!(a, b);
    h.source.emit(sample(53.0));
    wait_for_count(&h.recorder, 1).await;
    h.recorder.stop().await.unwrap();

    assert!(dir.path().join(&a).exists());
    assert!(dir.path().join(&b).exists());

    // Each file holds only its own session
    let opener = SqliteOpener::new(dir.path());
    assert_eq!(opener.open(&a).unwrap().meta().unwrap().count, 1);
    assert_eq!(opener.open(&b).unwrap().meta().unwrap().count, 1);
}
