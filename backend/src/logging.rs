//! Log output redaction
//!
//! Wraps a `tracing_subscriber` writer so every formatted event passes
//! through the shared [`Redactor`] before reaching its destination.

use crate::config::LoggingConfig;
use session_auth_shared::{PatternError, Redactor};
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Characters that end a `field=value` pair in formatted log lines
const LOG_SEPARATORS: &str = " ,;}\n";

/// Build the redactor described by `config`
///
/// Returns an inactive redactor when redaction is disabled.
pub fn redactor_from_config(config: &LoggingConfig) -> Result<Redactor, PatternError> {
    let fields: &[String] = if config.redact {
        &config.redacted_fields
    } else {
        &[]
    };
    Redactor::new(fields, &config.redaction, LOG_SEPARATORS)
}

/// `MakeWriter` that redacts everything written through it
#[derive(Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
    redactor: Arc<Redactor>,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M, redactor: Redactor) -> Self {
        Self {
            inner,
            redactor: Arc::new(redactor),
        }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            redactor: Arc::clone(&self.redactor),
        }
    }
}

/// Writer returned by [`RedactingMakeWriter`]
///
/// The fmt layer hands over one fully formatted event per `write`, so
/// each call is redacted as a unit.
pub struct RedactingWriter<W> {
    inner: W,
    redactor: Arc<Redactor>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let redacted = self.redactor.redact(&text);
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
