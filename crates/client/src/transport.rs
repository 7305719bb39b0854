//! Shared multiplexed transport: one connection, one worker, many clients.
//!
//! Clients created with [`Client::with_transport`](crate::Client::with_transport)
//! do not run a dispatch worker of their own. The transport's worker ticks
//! the shared engine once per pass and then runs every registered client's
//! dispatch tick, under that client's own serialization lock and with user
//! callbacks fired outside it, the same rules as for a stand-alone client.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::client::ClientCore;
use crate::config::DeviceConfig;
use crate::error::ClientError;
use crate::lower::{LowLevelClient, SharedEngine, SharedEngineProvider};
use crate::queue::PendingCallbacks;
use crate::worker;

const TRANSPORT_TICK: Duration = Duration::from_millis(1);

/// A transport connection shared by several logical clients.
///
/// Cheap to clone; the connection lives until the last handle (including
/// the ones held by attached clients) is gone.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    state: Mutex<EngineState>,
    worker: Mutex<Option<JoinHandle<()>>>,
    clients: Mutex<Vec<Registration>>,
    /// Held by the worker for the duration of one client-tick pass.
    /// Detaching a client takes it once after unregistering, so no callback
    /// for that client can fire after the detach returns.
    tick_guard: Mutex<()>,
}

struct EngineState {
    engine: Box<dyn SharedEngine>,
    stop: bool,
}

#[derive(Clone)]
struct Registration {
    core: Arc<Mutex<ClientCore>>,
    queue: PendingCallbacks,
}

impl Transport {
    /// Opens a shared connection to `host_name` through the given provider.
    pub fn new(provider: &dyn SharedEngineProvider, host_name: &str) -> Result<Self, ClientError> {
        if host_name.is_empty() {
            return Err(ClientError::InvalidArgument("host name is empty"));
        }
        let engine = provider.open(host_name)?;
        Ok(Transport {
            inner: Arc::new(TransportInner {
                state: Mutex::new(EngineState { engine, stop: true }),
                worker: Mutex::new(None),
                clients: Mutex::new(Vec::new()),
                tick_guard: Mutex::new(()),
            }),
        })
    }

    /// Creates the per-client engine for one more device, under the engine
    /// lock.
    pub(crate) fn attach(&self, device: &DeviceConfig) -> Result<Box<dyn LowLevelClient>, ClientError> {
        let mut state = lock(&self.inner.state);
        Ok(state.engine.attach(device)?)
    }

    /// Registers a client with the multiplexed worker, starting the worker
    /// if this is the first registration.
    pub(crate) fn start_worker(
        &self,
        core: &Arc<Mutex<ClientCore>>,
        queue: &PendingCallbacks,
    ) -> Result<(), ClientError> {
        {
            let mut worker = lock(&self.inner.worker);
            if worker.is_none() {
                lock(&self.inner.state).stop = false;
                let inner = Arc::clone(&self.inner);
                match thread::Builder::new()
                    .name("hublink-transport-worker".to_owned())
                    .spawn(move || transport_worker_loop(inner))
                {
                    Ok(handle) => *worker = Some(handle),
                    Err(e) => {
                        log::error!("failed to spawn the transport worker: {e}");
                        return Err(ClientError::WorkerStart);
                    }
                }
            }
        }

        let mut clients = lock(&self.inner.clients);
        if !clients.iter().any(|reg| Arc::ptr_eq(&reg.core, core)) {
            clients.push(Registration {
                core: Arc::clone(core),
                queue: queue.clone(),
            });
        }
        Ok(())
    }

    /// Unregisters a detaching client. Returns true when this was the last
    /// client and the caller must join the worker.
    pub(crate) fn signal_end_worker(&self, core: &Arc<Mutex<ClientCore>>) -> bool {
        {
            let mut clients = lock(&self.inner.clients);
            clients.retain(|reg| !Arc::ptr_eq(&reg.core, core));
        }

        // Wait out any tick pass that snapshotted the registration list
        // before the removal above.
        drop(lock(&self.inner.tick_guard));

        let no_clients_left = lock(&self.inner.clients).is_empty();
        let worker_running = lock(&self.inner.worker).is_some();
        if worker_running && no_clients_left {
            lock(&self.inner.state).stop = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn join_worker(&self) {
        let handle = lock(&self.inner.worker).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("transport worker panicked");
            }
        }
    }
}

impl Drop for TransportInner {
    fn drop(&mut self) {
        // No client handles exist any more; stop a worker the application
        // left running and wait for it.
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .stop = true;
        if let Some(handle) = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            if handle.join().is_err() {
                log::error!("transport worker panicked");
            }
        }
    }
}

fn transport_worker_loop(inner: Arc<TransportInner>) {
    loop {
        {
            let mut state = lock(&inner.state);
            if state.stop {
                break;
            }
            state.engine.do_work();
        }
        {
            let _pass = lock(&inner.tick_guard);
            let registrations = lock(&inner.clients).clone();
            for reg in &registrations {
                worker::multiplexed_tick(&reg.core, &reg.queue);
            }
        }
        thread::sleep(TRANSPORT_TICK);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::error!("transport lock poisoned; continuing with the inner state");
        poisoned.into_inner()
    })
}
