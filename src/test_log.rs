//! Captures `tracing` output so tests can assert on diagnostics.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
pub(crate) struct CapturedLog {
    buf: Arc<Mutex<Vec<u8>>>,
}

pub(crate) struct CapturedLogGuard {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for CapturedLogGuard {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self.buf.lock().map_err(|_| io::Error::other("log buffer lock poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLogGuard;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedLogGuard { buf: Arc::clone(&self.buf) }
    }
}

impl CapturedLog {
    pub(crate) fn contents(&self) -> String {
        let guard = self.buf.lock().unwrap();
        String::from_utf8_lossy(&guard).into_owned()
    }
}

/// Run `f` with a thread-local subscriber; returns its result and every
/// warning or error it logged.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .without_time()
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, log.contents())
}
