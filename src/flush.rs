//! The background persistence worker.

use std::sync::mpsc;
use std::thread;

/// Sending half handed to the store. Holds at most one pending signal.
pub type Trigger = mpsc::SyncSender<()>;

/// Dedicated thread that runs one persistence pass per received signal.
///
/// The channel has capacity one. A signal sent while another is already
/// queued is dropped: the queued pass reads the map when it starts, so it
/// already covers the newer write. Joins the thread on drop.
pub struct PersistWorker {
    join_handle: Option<thread::JoinHandle<()>>,
}

impl PersistWorker {
    /// Spawn a worker and return it together with its trigger. Dropping every
    /// trigger lets the worker run any pending pass and then exit.
    pub fn start<F>(pass_fn: F) -> std::io::Result<(Self, Trigger)>
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<()>(1);

        let join_handle = thread::Builder::new()
            .name("tag-store-persist".into())
            .spawn(move || {
                while rx.recv().is_ok() {
                    pass_fn();
                }
            })?;

        let worker = Self {
            join_handle: Some(join_handle),
        };
        Ok((worker, tx))
    }
}

/// Non-blocking nudge. A full channel already guarantees a pass that will see
/// this write, and a disconnected one means the store is shutting down.
pub fn trigger(tx: &Trigger) {
    let _ = tx.try_send(());
}

impl Drop for PersistWorker {
    fn drop(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.join();
        }
    }
}

impl std::fmt::Debug for PersistWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistWorker")
            .field("running", &self.join_handle.is_some())
            .finish()
    }
}
