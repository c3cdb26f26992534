//! End-to-end rotation tests.

use proptest::prelude::*;
use rotolog_core::{generation_path, CancellationToken, RotateConfig, RotatingLog};
use rotolog_storage::InMemoryFileSystem;
use rotolog_testkit::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::thread;

const RECORD_LEN: usize = 60;

fn open_on_disk(config: RotateConfig) -> RotatingLog {
    RotatingLog::open(config, CancellationToken::new()).expect("open rotating log")
}

fn scenario_config(log: &TestLog) -> RotateConfig {
    RotateConfig::new(log.path())
        .retain(5)
        .max_size(16_000)
        .mode(0o600)
}

#[test]
fn rotates_twice_past_threshold() {
    let log = TestLog::new("rotating.log");
    let rotating = open_on_disk(scenario_config(&log));

    let mut rotations = 0;
    for seq in 0..600 {
        if rotating.dispatch(&record_of_len(seq, RECORD_LEN)).unwrap().rotated {
            rotations += 1;
        }
    }

    assert_eq!(rotations, 2);
    assert_eq!(log.generations(), vec![0, 1]);
    assert_eq!(log.files().len(), 3);
    assert_eq!(log.generation_len(0), Some(266 * 60));
    assert_eq!(log.generation_len(1), Some(266 * 60));
    assert_eq!(log.live_len(), rotating.size());
}

#[test]
fn held_pause_keeps_single_file() {
    let log = TestLog::new("paused.log");
    let rotating = open_on_disk(scenario_config(&log));

    let resume = rotating.pause();
    for seq in 0..600 {
        assert!(!rotating.dispatch(&record_of_len(seq, RECORD_LEN)).unwrap().rotated);
    }

    assert!(log.generations().is_empty());
    assert_eq!(log.files(), vec!["paused.log"]);
    assert!(log.live_len() > 16_000);
    assert_eq!(log.live_len(), 600 * 60);

    resume.resume();
    assert!(rotating.dispatch("next\n").unwrap().rotated);
    assert_eq!(log.generations(), vec![0]);
}

#[cfg(unix)]
#[test]
fn files_use_configured_mode() {
    use std::os::unix::fs::PermissionsExt;

    let log = TestLog::new("mode.log");
    let rotating = open_on_disk(scenario_config(&log).max_size(100));
    for seq in 0..5 {
        rotating.dispatch(&record_of_len(seq, RECORD_LEN)).unwrap();
    }

    let mode = std::fs::metadata(log.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn restart_resumes_size_from_disk() {
    let log = TestLog::new("restart.log");
    let config = scenario_config(&log).max_size(300);

    {
        let rotating = open_on_disk(config.clone());
        for seq in 0..4 {
            rotating.dispatch(&record_of_len(seq, RECORD_LEN)).unwrap();
        }
        assert_eq!(rotating.size(), 240);
    }

    let rotating = open_on_disk(config);
    assert_eq!(rotating.size(), 240);
    // 240 + 60 >= 300
    assert!(rotating.dispatch(&record_of_len(4, RECORD_LEN)).unwrap().rotated);
    assert_eq!(log.generation_len(0), Some(240));
}

#[test]
fn retention_discards_oldest() {
    let log = TestLog::new("retain.log");
    let rotating = open_on_disk(scenario_config(&log).retain(2).max_size(RECORD_LEN as u64));

    // Each record reaches the threshold on its own, so every dispatch rotates.
    for seq in 0..10 {
        rotating.dispatch(&record_of_len(seq, RECORD_LEN)).unwrap();
    }

    assert_eq!(log.generations(), vec![0, 1]);
    let newest = std::fs::read_to_string(log.path()).unwrap();
    assert!(newest.starts_with("00000009"));
}

#[test]
fn creates_parent_directories() {
    let log = TestLog::new("unused.log");
    let nested = log.dir().join("a").join("b").join("app.log");

    let rotating = RotatingLog::open(
        RotateConfig::new(&nested).create_parent_dirs(true),
        CancellationToken::new(),
    )
    .unwrap();
    rotating.dispatch("hello\n").unwrap();

    assert_eq!(std::fs::read(&nested).unwrap(), b"hello\n");
}

#[test]
fn missing_parent_directory_is_a_construction_error() {
    let log = TestLog::new("unused.log");
    let nested = log.dir().join("missing").join("app.log");

    let err = RotatingLog::open(RotateConfig::new(&nested), CancellationToken::new()).unwrap_err();
    assert!(matches!(err, rotolog_core::RotateError::Open { .. }));
}

#[test]
fn concurrent_dispatch_keeps_records_whole() {
    let log = TestLog::new("concurrent.log");
    let rotating = Arc::new(open_on_disk(
        RotateConfig::new(log.path()).retain(50).max_size(4_000),
    ));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let rotating = Arc::clone(&rotating);
            thread::spawn(move || {
                for i in 0..250 {
                    rotating.dispatch(&record_of_len(t * 1000 + i, 40)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let generations = log.generations();
    assert!(is_contiguous(&generations));

    let mut total = log.live_len();
    let mut lines = std::fs::read_to_string(log.path()).unwrap().lines().count();
    for k in &generations {
        let path = generation_path(log.path(), *k);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.len() < 4_000);
        assert!(text.lines().all(|line| line.len() == 39));
        total += text.len() as u64;
        lines += text.lines().count();
    }
    assert_eq!(total, 4 * 250 * 40);
    assert_eq!(lines, 1000);
}

#[test]
fn pause_freezes_generations_under_load() {
    let fs = InMemoryFileSystem::new();
    let rotating = Arc::new(
        RotatingLog::with_file_system(
            RotateConfig::new("app.log").retain(3).max_size(64),
            Arc::new(fs.clone()),
            CancellationToken::new(),
        )
        .unwrap(),
    );

    let stop = CancellationToken::new();
    let writer = {
        let rotating = Arc::clone(&rotating);
        let stop = stop.clone();
        thread::spawn(move || {
            let mut seq = 0;
            while !stop.is_cancelled() {
                rotating.dispatch(&record_of_len(seq, 16)).unwrap();
                seq += 1;
            }
        })
    };

    for _ in 0..20 {
        let resume = rotating.pause();
        let before = fs.contents(&generation_path(Path::new("app.log"), 0));
        thread::yield_now();
        let after = fs.contents(&generation_path(Path::new("app.log"), 0));
        assert_eq!(before, after);
        resume.resume();
        thread::yield_now();
    }

    stop.cancel();
    writer.join().unwrap();
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn rotation_follows_size_model(
        retain in retain_strategy(),
        threshold in threshold_strategy(),
        lengths in record_lengths_strategy(),
    ) {
        let fs = InMemoryFileSystem::new();
        let rotating = RotatingLog::with_file_system(
            RotateConfig::new("app.log").retain(retain).max_size(threshold),
            Arc::new(fs.clone()),
            CancellationToken::new(),
        )
        .unwrap();

        let mut size = 0u64;
        let mut rotations = 0usize;
        for (seq, len) in lengths.iter().enumerate() {
            let expect_rotate = size + *len as u64 >= threshold;
            let outcome = rotating.dispatch(&record_of_len(seq, *len)).unwrap();
            prop_assert_eq!(outcome.rotated, expect_rotate);
            prop_assert_eq!(outcome.written, *len);
            if expect_rotate {
                rotations += 1;
                size = 0;
            }
            size += *len as u64;
            prop_assert_eq!(rotating.size(), size);
        }

        let live = Path::new("app.log");
        prop_assert_eq!(fs.contents(live).unwrap().len() as u64, size);

        let kept = rotations.min(retain);
        for k in 0..retain + 1 {
            prop_assert_eq!(fs.exists(&generation_path(live, k)), k < kept);
        }
        prop_assert_eq!(fs.paths().len(), kept + 1);
    }
}
