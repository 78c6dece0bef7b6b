//! Runtime that responders deliver notifications on.

use crate::error::MockError;
use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

pub(crate) struct Scheduler {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
}

impl Scheduler {
    pub fn new(worker_threads: usize) -> Result<Self, MockError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("netmock-delivery")
            .enable_time()
            .build()
            .map_err(MockError::Scheduler)?;
        let handle = runtime.handle().clone();
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            handle,
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Stop the runtime without waiting for in-flight deliveries.
    pub fn shutdown(&self) {
        if let Some(runtime) = self.runtime.lock().take() {
            debug!("Shutting down delivery scheduler");
            runtime.shutdown_background();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
