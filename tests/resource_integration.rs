//! Integration tests for resource-safe scopes with real file I/O.
//!
//! Every scope here creates a temp file on acquire and deletes it on release;
//! the tests check the file is gone however the scope ends.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use millrace::proxy::{self, consumer, pipes, producer, Effect};
use millrace::resource::{use_aff, use_eff, use_proxy, use_with, Release};
use millrace::{assert_fail, assert_succ, Aff, Eff, Error, Fin, HasCancel, Runtime};

// ============================================================================
// Helpers
// ============================================================================

/// A temp file that deletes itself on release.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn create(name: &str, contents: &str) -> io::Result<Self> {
        let path = temp_file_path(name);
        std::fs::write(&path, contents)?;
        Ok(TempFile { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Release for TempFile {
    fn release(self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn temp_file_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("millrace_resource_test_{}_{}.txt", name, std::process::id()))
}

fn create(name: &'static str, contents: &'static str) -> Eff<TempFile> {
    Eff::from_result(move |_| TempFile::create(name, contents))
}

// ============================================================================
// Synchronous scopes
// ============================================================================

#[test]
fn use_eff_deletes_temp_file_on_success() {
    let path = temp_file_path("eff_success");
    let eff = use_eff(create("eff_success", "test content"), |file| {
        let path = file.path().to_path_buf();
        Eff::from_result(move |_| std::fs::read_to_string(path))
    });

    assert_succ!(eff.run_standalone(), "test content");
    assert!(!path.exists(), "temp file should be deleted");
}

#[test]
fn use_eff_deletes_temp_file_on_body_failure() {
    let path = temp_file_path("eff_failure");
    let eff = use_eff(create("eff_failure", "x"), |_| {
        Eff::<String>::fail(Error::coded(500, "processing failed"))
    });

    assert_fail!(eff.run_standalone(), Error::coded(500, "processing failed"));
    assert!(!path.exists(), "temp file should be deleted after failure");
}

#[test]
fn use_eff_io_error_becomes_exceptional() {
    let eff = use_eff(create("eff_io_error", "x"), |_| {
        Eff::<String>::from_result(|_| std::fs::read_to_string("/definitely/not/here"))
    });

    let error = eff.run_standalone().err().expect("read should fail");
    assert!(error.is_exception::<io::Error>());
    assert_eq!(
        error.downcast_ref::<io::Error>().map(|e| e.kind()),
        Some(io::ErrorKind::NotFound)
    );
}

#[test]
fn use_eff_skips_release_when_acquire_fails() {
    let eff = use_eff(
        Eff::<TempFile>::from_result(|_| TempFile::create("../../no/such/dir/file", "x")),
        |_| -> Eff<()> { panic!("body must not run") },
    );

    let error = eff.run_standalone().err().expect("acquire should fail");
    assert!(error.is_exception::<io::Error>());
}

#[test]
fn use_with_runs_custom_cleanup() {
    let path = temp_file_path("with_cleanup");
    let acquire_path = path.clone();
    let eff: Eff<u64> = use_with(
        Eff::from_result(move |_| {
            std::fs::write(&acquire_path, "12345")?;
            Ok::<_, io::Error>(acquire_path)
        }),
        |p: PathBuf| {
            let _ = std::fs::remove_file(p);
        },
        |p| Eff::from_result({
            let p = p.clone();
            move |_| std::fs::metadata(p).map(|m| m.len())
        }),
    );

    assert_succ!(eff.run_standalone(), 5);
    assert!(!path.exists());
}

// ============================================================================
// Asynchronous scopes
// ============================================================================

#[tokio::test]
async fn use_aff_deletes_temp_file_after_async_read() {
    let path = temp_file_path("aff_success");
    let aff: Aff<String> = use_aff(create("aff_success", "async content").to_aff(), |file| {
        let path = file.path().to_path_buf();
        Aff::from_result_async(move |_| async move { tokio::fs::read_to_string(path).await })
    });

    assert_succ!(aff.run_standalone().await, "async content");
    assert!(!path.exists());
}

#[tokio::test]
async fn use_aff_deletes_temp_file_on_cancellation() {
    let path = temp_file_path("aff_cancel");
    let rt = Runtime::new();
    let canceller = rt.clone();
    let aff: Aff<()> = use_aff(create("aff_cancel", "x").to_aff(), |_| {
        Aff::from_future(tokio::time::sleep(Duration::from_secs(30)))
    });

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    assert_eq!(aff.run(&rt).await, Fin::Fail(Error::cancelled()));
    assert!(rt.is_cancelled());
    assert!(!path.exists(), "cancelled scope should still release");
}

#[tokio::test]
async fn use_aff_deletes_temp_file_on_timeout() {
    let path = temp_file_path("aff_timeout");
    let aff: Aff<()> = use_aff(create("aff_timeout", "x").to_aff(), |_| {
        Aff::from_future(tokio::time::sleep(Duration::from_secs(30)))
    })
    .timeout(Duration::from_millis(10));

    assert_eq!(aff.run_standalone().await, Fin::Fail(Error::timed_out()));
    assert!(!path.exists());
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn use_proxy_streams_lines_then_deletes_file() {
    let path = temp_file_path("proxy_lines");
    let source = use_proxy(create("proxy_lines", "alpha\nbeta\ngamma"), |file| {
        let lines: Vec<String> = std::fs::read_to_string(file.path())
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default();
        producer::each(lines)
    });
    let lengths = proxy::pipe(source, pipes::map(|line: String| line.len()));
    let all: Eff<Vec<usize>> = producer::collect(lengths);

    assert_succ!(all.run_standalone(), vec![5, 4, 5]);
    assert!(!path.exists());
}

#[test]
fn use_proxy_deletes_file_when_consumer_stops_early() {
    let path = temp_file_path("proxy_early");
    let source = use_proxy(create("proxy_early", "x"), |_| producer::each(0..u32::MAX));
    let effect: Effect<Runtime, ()> =
        proxy::pipe(proxy::pipe(source, pipes::take(2)), consumer::drain());

    assert_succ!(proxy::run_effect(effect).run_standalone(), ());
    assert!(!path.exists());
}
