//! Model import on a background worker with progress reporting and cooperative cancel.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

use anyhow::Context as _;
use crossbeam_channel::{Receiver, Sender};

use crate::error::{FxStudioError, FxStudioResult};

/// Interchange formats accepted by the converter (lower-case extensions).
pub const SUPPORTED_EXTENSIONS: [&str; 9] =
    ["fbx", "dae", "blend", "3ds", "ase", "obj", "ply", "x", "ms3d"];

pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Turns an interchange file into a `.model` file.
///
/// `progress` takes a percentage in `0..=100` and returns false once the import has been
/// cancelled; converters should stop promptly after that.
pub trait ModelConverter: Send + Sync {
    fn convert(
        &self,
        source: &Path,
        dest: &Path,
        progress: &mut dyn FnMut(f32) -> bool,
    ) -> FxStudioResult<()>;
}

/// Byte-for-byte copy in fixed chunks. Stands in for the external format converter.
#[derive(Clone, Copy, Debug)]
pub struct CopyConverter {
    pub chunk_size: usize,
}

impl Default for CopyConverter {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
        }
    }
}

impl ModelConverter for CopyConverter {
    fn convert(
        &self,
        source: &Path,
        dest: &Path,
        progress: &mut dyn FnMut(f32) -> bool,
    ) -> FxStudioResult<()> {
        let mut input =
            File::open(source).with_context(|| format!("open '{}'", source.display()))?;
        let total = input.metadata().map(|m| m.len()).unwrap_or(0);
        let mut output =
            File::create(dest).with_context(|| format!("create '{}'", dest.display()))?;

        let mut buf = vec![0u8; self.chunk_size.max(1)];
        let mut copied = 0u64;
        loop {
            let n = input
                .read(&mut buf)
                .with_context(|| format!("read '{}'", source.display()))?;
            if n == 0 {
                break;
            }
            output
                .write_all(&buf[..n])
                .with_context(|| format!("write '{}'", dest.display()))?;
            copied += n as u64;
            let pct = if total == 0 {
                100.0
            } else {
                (copied as f64 / total as f64 * 100.0) as f32
            };
            if !progress(pct.min(100.0)) {
                return Ok(());
            }
        }
        progress(100.0);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    Completed(PathBuf),
    Cancelled,
    Failed(String),
}

/// Caller-side end of a running import.
pub struct ImportHandle {
    cancel: Arc<AtomicBool>,
    progress: Receiver<f32>,
    done: Receiver<ImportOutcome>,
    thread: Option<JoinHandle<()>>,
    last_progress: f32,
}

impl ImportHandle {
    /// Requests cancellation; the worker notices at its next progress report.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Latest reported percentage, without blocking.
    pub fn try_progress(&mut self) -> f32 {
        for p in self.progress.try_iter() {
            self.last_progress = p;
        }
        self.last_progress
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Blocks until the worker finishes and returns its outcome.
    pub fn wait(mut self) -> ImportOutcome {
        let outcome = self
            .done
            .recv()
            .unwrap_or_else(|_| ImportOutcome::Failed("import worker exited unexpectedly".into()));
        if let Some(t) = self.thread.take()
            && t.join().is_err()
        {
            return ImportOutcome::Failed("import worker panicked".into());
        }
        outcome
    }
}

/// Validates the job and starts converting on a dedicated thread.
pub fn spawn_import(
    job: ImportJob,
    converter: Arc<dyn ModelConverter>,
) -> FxStudioResult<ImportHandle> {
    if !job.source.is_file() {
        return Err(FxStudioError::import(format!(
            "source '{}' does not exist",
            job.source.display()
        )));
    }
    if !is_supported_format(&job.source) {
        return Err(FxStudioError::import(format!(
            "unsupported model format '{}'",
            job.source.display()
        )));
    }
    if let Some(parent) = job.dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create '{}'", parent.display()))?;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let (progress_tx, progress_rx) = crossbeam_channel::unbounded();
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);

    let worker_cancel = Arc::clone(&cancel);
    let thread = std::thread::Builder::new()
        .name("model-import".into())
        .spawn(move || run_import(job, converter.as_ref(), &worker_cancel, progress_tx, done_tx))
        .map_err(|e| FxStudioError::import(format!("failed to start import worker: {e}")))?;

    Ok(ImportHandle {
        cancel,
        progress: progress_rx,
        done: done_rx,
        thread: Some(thread),
        last_progress: 0.0,
    })
}

fn run_import(
    job: ImportJob,
    converter: &dyn ModelConverter,
    cancel: &AtomicBool,
    progress_tx: Sender<f32>,
    done_tx: Sender<ImportOutcome>,
) {
    tracing::info!(source = %job.source.display(), dest = %job.dest.display(), "import started");
    // True once a progress report answered false.
    let mut stopped = false;
    let mut report = |pct: f32| {
        // The receiver may already be gone; progress is advisory.
        let _ = progress_tx.send(pct);
        let keep_going = !cancel.load(Ordering::Relaxed);
        stopped |= !keep_going;
        keep_going
    };
    let result = converter.convert(&job.source, &job.dest, &mut report);

    let outcome = if stopped {
        std::fs::remove_file(&job.dest).ok();
        tracing::warn!(source = %job.source.display(), "import cancelled");
        ImportOutcome::Cancelled
    } else {
        match result {
            Ok(()) => {
                tracing::info!(dest = %job.dest.display(), "import finished");
                ImportOutcome::Completed(job.dest)
            }
            Err(e) => {
                std::fs::remove_file(&job.dest).ok();
                tracing::warn!(error = %e, "import failed");
                ImportOutcome::Failed(e.to_string())
            }
        }
    };
    let _ = done_tx.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fxstudio_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Reports progress until told to stop.
    struct SpinConverter;

    impl ModelConverter for SpinConverter {
        fn convert(
            &self,
            _source: &Path,
            dest: &Path,
            progress: &mut dyn FnMut(f32) -> bool,
        ) -> FxStudioResult<()> {
            std::fs::write(dest, b"partial").unwrap();
            let mut pct = 0.0;
            while progress(pct) {
                pct = (pct + 1.0) % 100.0;
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            Ok(())
        }
    }

    /// Writes its output without reporting progress once `gate` opens.
    struct GatedConverter {
        gate: Receiver<()>,
    }

    impl ModelConverter for GatedConverter {
        fn convert(
            &self,
            _source: &Path,
            dest: &Path,
            _progress: &mut dyn FnMut(f32) -> bool,
        ) -> FxStudioResult<()> {
            self.gate.recv().unwrap();
            std::fs::write(dest, b"model").unwrap();
            Ok(())
        }
    }

    struct FailingConverter;

    impl ModelConverter for FailingConverter {
        fn convert(
            &self,
            _source: &Path,
            _dest: &Path,
            _progress: &mut dyn FnMut(f32) -> bool,
        ) -> FxStudioResult<()> {
            Err(FxStudioError::import("corrupt mesh"))
        }
    }

    #[test]
    fn format_check_is_case_insensitive() {
        assert!(is_supported_format(Path::new("a/ship.FBX")));
        assert!(is_supported_format(Path::new("robot.ms3d")));
        assert!(!is_supported_format(Path::new("notes.txt")));
        assert!(!is_supported_format(Path::new("noext")));
    }

    #[test]
    fn copy_import_completes_with_full_progress() {
        let dir = temp_dir("import_copy");
        let source = dir.join("cube.obj");
        std::fs::write(&source, vec![7u8; 10_000]).unwrap();
        let dest = dir.join("Models").join("cube.model");

        let handle = spawn_import(
            ImportJob {
                source,
                dest: dest.clone(),
            },
            Arc::new(CopyConverter { chunk_size: 1024 }),
        )
        .unwrap();
        assert_eq!(handle.wait(), ImportOutcome::Completed(dest.clone()));
        assert_eq!(std::fs::read(&dest).unwrap().len(), 10_000);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cancel_stops_worker_and_removes_output() {
        let dir = temp_dir("import_cancel");
        let source = dir.join("big.fbx");
        std::fs::write(&source, b"x").unwrap();
        let dest = dir.join("big.model");

        let mut handle = spawn_import(
            ImportJob {
                source,
                dest: dest.clone(),
            },
            Arc::new(SpinConverter),
        )
        .unwrap();
        while handle.try_progress() < 1.0 {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        handle.cancel();
        assert_eq!(handle.wait(), ImportOutcome::Cancelled);
        assert!(!dest.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cancel_unseen_by_converter_keeps_finished_model() {
        let dir = temp_dir("import_late_cancel");
        let source = dir.join("ship.obj");
        std::fs::write(&source, b"x").unwrap();
        let dest = dir.join("ship.model");

        let (open, gate) = crossbeam_channel::bounded(1);
        let handle = spawn_import(
            ImportJob {
                source,
                dest: dest.clone(),
            },
            Arc::new(GatedConverter { gate }),
        )
        .unwrap();
        handle.cancel();
        open.send(()).unwrap();
        assert_eq!(handle.wait(), ImportOutcome::Completed(dest.clone()));
        assert_eq!(std::fs::read(&dest).unwrap(), b"model");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn converter_error_is_reported_as_failure() {
        let dir = temp_dir("import_fail");
        let source = dir.join("bad.dae");
        std::fs::write(&source, b"x").unwrap();

        let handle = spawn_import(
            ImportJob {
                source,
                dest: dir.join("bad.model"),
            },
            Arc::new(FailingConverter),
        )
        .unwrap();
        let ImportOutcome::Failed(msg) = handle.wait() else {
            panic!("expected failure");
        };
        assert!(msg.contains("corrupt mesh"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_missing_or_unsupported_sources() {
        let dir = temp_dir("import_reject");
        let txt = dir.join("readme.txt");
        std::fs::write(&txt, b"x").unwrap();
        let job = |source: PathBuf| ImportJob {
            source,
            dest: dir.join("out.model"),
        };
        let copy = Arc::new(CopyConverter::default());
        assert!(spawn_import(job(dir.join("missing.obj")), copy.clone()).is_err());
        assert!(spawn_import(job(txt), copy).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
