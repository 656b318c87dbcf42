//! Keep-alive presence updates while a connection is open.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::protocol::{Link, Presence};

use super::SUPERVISOR_TARGET;

/// Handle to a running heartbeat thread.
///
/// The thread announces [`Presence::Available`] every interval until the
/// handle is stopped or dropped. Stopping joins the thread, so no tick can
/// fire after [`Heartbeat::stop`] returns.
#[derive(Debug)]
pub struct Heartbeat {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Starts ticking against `link`.
    ///
    /// # Errors
    ///
    /// Returns the IO error raised when the thread cannot be spawned.
    pub fn start(link: Arc<dyn Link>, interval: Duration) -> io::Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("parley-heartbeat".to_owned())
            .spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(interval) {
                    match link.send_presence(None, Presence::Available) {
                        Ok(()) => debug!(target: SUPERVISOR_TARGET, "heartbeat sent"),
                        Err(error) => warn!(
                            target: SUPERVISOR_TARGET,
                            error = %error,
                            "heartbeat failed"
                        ),
                    }
                }
            })?;
        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    /// Reports whether the thread is still ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!(target: SUPERVISOR_TARGET, "heartbeat thread panicked");
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.shutdown();
    }
}
