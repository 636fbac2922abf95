//! X11 Async Event Stream
//!
//! Wakes the tokio event loop when the X11 socket has data. A mio poll on
//! the connection's file descriptor runs on a blocking thread and signals a
//! [`Notify`]; events are then drained without blocking.

use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, Notify};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

/// Readiness-driven X11 event source
pub struct X11EventStream {
    conn: Arc<RustConnection>,
    notify: Arc<Notify>,
    /// Dropping the stream closes this and stops the poll thread
    _task_guard: oneshot::Receiver<()>,
}

impl X11EventStream {
    /// Start polling the connection's file descriptor
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let notify = Arc::new(Notify::new());
        let task_notify = notify.clone();

        let (guard, task_guard) = oneshot::channel::<()>();
        let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
        let mut events = mio::Events::with_capacity(1);

        poll.registry()
            .register(
                &mut mio::unix::SourceFd(&fd),
                mio::Token(0),
                mio::Interest::READABLE,
            )
            .context("Failed to register X11 FD with mio")?;

        let timeout = Duration::from_millis(100);
        tokio::task::spawn_blocking(move || loop {
            if guard.is_closed() {
                tracing::info!("X11 socket polling thread shutting down");
                return;
            }

            if let Err(err) = poll.poll(&mut events, Some(timeout)) {
                tracing::warn!("X11 socket poll failed: {:?}", err);
                continue;
            }

            events
                .iter()
                .filter(|event| event.token() == mio::Token(0))
                .for_each(|_| task_notify.notify_one());
        });

        Ok(Self {
            conn,
            notify,
            _task_guard: task_guard,
        })
    }

    /// Next buffered event, or `None` once the buffer is drained
    pub fn poll_next_event(&self) -> Result<Option<Event>> {
        Ok(self.conn.poll_for_event()?)
    }

    /// Resolve once the socket has become readable
    pub async fn wait_readable(&self) {
        self.notify.notified().await;
    }

    /// Push queued requests to the server
    pub fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}
