//! Log relay to the bridge host.
//!
//! A `tracing_subscriber` fmt layer writes each formatted event into a
//! bounded [`LogQueue`]; the service drains the queue into `Log` telemetry
//! once per cycle. Events logged under [`RELAY_TARGET`] are never queued, so
//! relay diagnostics cannot feed themselves.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;

/// Target for relay diagnostics. Excluded from the relay.
pub const RELAY_TARGET: &str = "zms_control::log_relay";

/// Default number of queued lines.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
struct QueueInner {
    lines: VecDeque<String>,
    capacity: usize,
    dropped: u64,
}

/// Bounded queue of formatted log lines. Oldest lines are dropped first.
#[derive(Debug, Clone)]
pub struct LogQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl LogQueue {
    /// Queue holding at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                lines: VecDeque::with_capacity(capacity),
                capacity,
                dropped: 0,
            })),
        }
    }

    /// Append a line, evicting the oldest when full.
    pub fn push(&self, line: String) {
        let mut inner = self.inner.lock();
        if inner.lines.len() == inner.capacity {
            inner.lines.pop_front();
            inner.dropped += 1;
        }
        inner.lines.push_back(line);
    }

    /// Take up to `max` lines, oldest first.
    pub fn drain(&self, max: usize) -> Vec<String> {
        let mut inner = self.inner.lock();
        let n = max.min(inner.lines.len());
        inner.lines.drain(..n).collect()
    }

    /// Lines waiting.
    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    /// Whether no line is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines evicted since creation.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }
}

impl Default for LogQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Collects one formatted event and queues it on drop.
pub struct LineWriter {
    queue: LogQueue,
    buf: Vec<u8>,
}

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            self.queue.push(line.to_owned());
        }
    }
}

impl<'a> MakeWriter<'a> for LogQueue {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            queue: self.clone(),
            buf: Vec::new(),
        }
    }
}

/// Layer formatting INFO and above into `queue`, without timestamps or
/// colors.
pub fn bridge_layer<S>(queue: LogQueue) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(queue)
        .with_ansi(false)
        .without_time()
        .with_filter(filter::filter_fn(|meta| {
            meta.target() != RELAY_TARGET && *meta.level() <= Level::INFO
        }))
}
