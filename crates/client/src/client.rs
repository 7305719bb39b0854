//! The client facade: every public operation, the uniform lock recipe, and
//! teardown.
//!
//! Operations follow one shape: validate arguments, lazily start the
//! dispatch worker, take the serialization lock, call the lower layer
//! (wrapping any one-shot callback in a thunk that enqueues a typed
//! record), release the lock. User callbacks never fire on the caller's
//! thread and never under the lock.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crate::callbacks::{
    CallbackTable, EventConfirmationCallback, GetTwinCallback, MessageCallback,
    MethodInvokeCallback, ReportedStateCallback, UploadCallback,
};
use crate::config::{ClientConfig, DeviceConfig};
use crate::error::{ClientError, LowLevelError};
use crate::lower::{
    ConfirmationThunk, ConnectionStatusThunk, GetTwinThunk, LowLevelClient, LowLevelProvider,
    MessageThunk, MethodThunk, ReportedStateThunk, TwinUpdateThunk, UploadBlockSource,
};
use crate::message::Message;
use crate::queue::{PendingCallbacks, QueuedCallback};
use crate::tasks::{TaskKind, TaskRegistry};
use crate::transport::Transport;
use crate::types::{
    ConnectionStatus, ConnectionStatusReason, MessageDisposition, MethodId, MethodReply,
    MethodTarget, OptionValue, RetryPolicy, SendStatus, TwinUpdateState, UploadOutcome,
};
use crate::worker;

/// Option name controlling the worker's inter-tick sleep, in milliseconds.
pub const OPTION_DO_WORK_FREQUENCY_IN_MS: &str = "do_work_freq_ms";
/// Option name for the per-message timeout ceiling, in milliseconds.
pub const OPTION_MESSAGE_TIMEOUT: &str = "messageTimeout";

pub(crate) const DO_WORK_FREQ_DEFAULT_MS: u64 = 1;
const DO_WORK_MAX_FREQ_MS: u64 = 100;

const METHOD_EMPTY_PAYLOAD: &[u8] = b"{}";

/// State guarded by the serialization lock. Every lower-layer entry point
/// is reached through a `MutexGuard` over this.
pub(crate) struct ClientCore {
    pub(crate) ll: Box<dyn LowLevelClient>,
    pub(crate) callbacks: CallbackTable,
    pub(crate) tasks: TaskRegistry,
    pub(crate) stop: bool,
    pub(crate) worker: Option<JoinHandle<()>>,
    pub(crate) do_work_freq_ms: u64,
    pub(crate) message_timeout_ms: Option<u64>,
}

/// Lock acquisition is non-fatal by policy: a poisoning panic cannot have
/// happened during user code (callbacks run outside the lock), so the
/// inner state is taken as-is and the incident logged.
pub(crate) fn lock_core(core: &Mutex<ClientCore>) -> MutexGuard<'_, ClientCore> {
    core.lock().unwrap_or_else(|poisoned| {
        log::error!("client state lock poisoned; continuing with the inner state");
        poisoned.into_inner()
    })
}

/// A threaded hub client for one logical device or module.
///
/// The handle may be used from any thread. Asynchronous completions (send
/// confirmations, twin reads, inbound messages and methods) are delivered
/// on a background dispatch worker, which is started lazily by
/// the first operation that can produce such traffic. [`destroy`] (or
/// dropping the handle) delivers a terminal notification to every pending
/// one-shot callback and blocks until the worker and all detached upload /
/// method-invoke tasks have finished.
///
/// [`destroy`]: Client::destroy
pub struct Client {
    core: Arc<Mutex<ClientCore>>,
    queue: PendingCallbacks,
    transport: Option<Transport>,
    torn_down: bool,
}

impl Client {
    /// Connects using a `HostName=...;DeviceId=...;...` connection string
    /// and the given transport provider.
    pub fn from_connection_string(
        connection_string: &str,
        provider: &dyn LowLevelProvider,
    ) -> Result<Self, ClientError> {
        let config = ClientConfig::from_connection_string(connection_string)?;
        Self::from_config(&config, provider)
    }

    /// Connects using an already resolved configuration.
    pub fn from_config(
        config: &ClientConfig,
        provider: &dyn LowLevelProvider,
    ) -> Result<Self, ClientError> {
        let ll = provider.connect(config)?;
        Ok(Self::new(ll, None))
    }

    /// Connects as the module this process runs as, resolved from the edge
    /// runtime's environment.
    pub fn from_environment(provider: &dyn LowLevelProvider) -> Result<Self, ClientError> {
        let config = ClientConfig::from_environment()?;
        Self::from_config(&config, provider)
    }

    /// Attaches one more logical client to a shared [`Transport`].
    ///
    /// The client contributes its dispatch tick to the transport's
    /// multiplexed worker instead of running a worker of its own.
    pub fn with_transport(transport: &Transport, device: &DeviceConfig) -> Result<Self, ClientError> {
        let ll = transport.attach(device)?;
        Ok(Self::new(ll, Some(transport.clone())))
    }

    fn new(ll: Box<dyn LowLevelClient>, transport: Option<Transport>) -> Self {
        Client {
            core: Arc::new(Mutex::new(ClientCore {
                ll,
                callbacks: CallbackTable::default(),
                tasks: TaskRegistry::default(),
                stop: false,
                worker: None,
                do_work_freq_ms: DO_WORK_FREQ_DEFAULT_MS,
                message_timeout_ms: None,
            })),
            queue: PendingCallbacks::new(),
            transport,
            torn_down: false,
        }
    }

    fn start_worker_if_needed(&self) -> Result<(), ClientError> {
        if let Some(transport) = &self.transport {
            return transport.start_worker(&self.core, &self.queue);
        }
        let mut core = lock_core(&self.core);
        if core.worker.is_none() {
            core.stop = false;
            match worker::spawn_client_worker(Arc::clone(&self.core), self.queue.clone()) {
                Ok(handle) => core.worker = Some(handle),
                Err(e) => {
                    log::error!("failed to spawn the dispatch worker: {e}");
                    return Err(ClientError::WorkerStart);
                }
            }
        }
        Ok(())
    }

    fn confirmation_thunk(&self, on_confirmation: EventConfirmationCallback) -> ConfirmationThunk {
        let queue = self.queue.clone();
        Box::new(move |result| {
            queue.push(QueuedCallback::Confirmation {
                result,
                on_confirmation: Some(on_confirmation),
            });
        })
    }

    /// Queues `message` for delivery. If a confirmation callback is given
    /// it fires exactly once: `Ok`/`Error`/`MessageTimeout` from the
    /// transport, or `BecauseDestroy` if the client is torn down first.
    pub fn send_event(
        &self,
        message: Message,
        on_confirmation: Option<EventConfirmationCallback>,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let thunk = on_confirmation.map(|cb| self.confirmation_thunk(cb));
        core.ll.send_event(message, thunk)?;
        Ok(())
    }

    /// As [`send_event`](Client::send_event), with the message addressed to
    /// a named output route before it is handed to the transport.
    pub fn send_event_to_output(
        &self,
        message: Message,
        output_name: &str,
        on_confirmation: Option<EventConfirmationCallback>,
    ) -> Result<(), ClientError> {
        if output_name.is_empty() {
            return Err(ClientError::InvalidArgument("output name is empty"));
        }
        self.send_event(message.with_output_name(output_name), on_confirmation)
    }

    /// Whether the transport still holds unsent traffic, consistent with
    /// the lower layer at the moment of the call.
    pub fn send_status(&self) -> SendStatus {
        lock_core(&self.core).ll.get_send_status()
    }

    /// Replaces the standing inbound-message handler. The disposition the
    /// handler returns is shipped back to the hub unless it is
    /// [`MessageDisposition::AsyncAck`], in which case the application
    /// settles later via
    /// [`send_message_disposition`](Client::send_message_disposition).
    pub fn set_message_callback(
        &self,
        handler: impl Fn(&Message) -> MessageDisposition + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let thunk: MessageThunk = Box::new(move |message| {
            queue.push(QueuedCallback::Message { message });
        });
        core.ll.set_message_callback(Some(thunk))?;
        core.callbacks.message = Some(Arc::new(handler));
        Ok(())
    }

    pub fn clear_message_callback(&self) -> Result<(), ClientError> {
        let mut core = lock_core(&self.core);
        core.ll.set_message_callback(None)?;
        core.callbacks.message = None;
        Ok(())
    }

    /// Registers the handler for one named input route.
    pub fn set_input_message_callback(
        &self,
        input_name: &str,
        handler: impl Fn(&Message) -> MessageDisposition + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        if input_name.is_empty() {
            return Err(ClientError::InvalidArgument("input name is empty"));
        }
        self.start_worker_if_needed()?;
        let handler: MessageCallback = Arc::new(handler);
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let route = input_name.to_owned();
        let record_handler = Arc::clone(&handler);
        let thunk: MessageThunk = Box::new(move |message| {
            queue.push(QueuedCallback::InputMessage {
                input_name: route.clone(),
                message,
                handler: Arc::clone(&record_handler),
            });
        });
        core.ll.set_input_message_callback(input_name, Some(thunk))?;
        core.callbacks.inputs.insert(input_name.to_owned(), handler);
        Ok(())
    }

    pub fn clear_input_message_callback(&self, input_name: &str) -> Result<(), ClientError> {
        if input_name.is_empty() {
            return Err(ClientError::InvalidArgument("input name is empty"));
        }
        let mut core = lock_core(&self.core);
        core.ll.set_input_message_callback(input_name, None)?;
        core.callbacks.inputs.remove(input_name);
        Ok(())
    }

    pub fn set_connection_status_callback(
        &self,
        handler: impl Fn(ConnectionStatus, ConnectionStatusReason) + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let thunk: ConnectionStatusThunk = Box::new(move |status, reason| {
            queue.push(QueuedCallback::ConnectionStatus { status, reason });
        });
        core.ll.set_connection_status_callback(Some(thunk))?;
        core.callbacks.connection_status = Some(Arc::new(handler));
        Ok(())
    }

    pub fn clear_connection_status_callback(&self) -> Result<(), ClientError> {
        let mut core = lock_core(&self.core);
        core.ll.set_connection_status_callback(None)?;
        core.callbacks.connection_status = None;
        Ok(())
    }

    pub fn set_retry_policy(&self, policy: RetryPolicy, timeout_secs: u64) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        lock_core(&self.core).ll.set_retry_policy(policy, timeout_secs)?;
        Ok(())
    }

    pub fn retry_policy(&self) -> (RetryPolicy, u64) {
        lock_core(&self.core).ll.retry_policy()
    }

    /// Time the transport last received any message, if it has received one.
    pub fn last_message_receive_time(&self) -> Option<SystemTime> {
        lock_core(&self.core).ll.last_message_receive_time()
    }

    /// Replaces the standing desired-twin handler.
    pub fn set_twin_callback(
        &self,
        handler: impl Fn(TwinUpdateState, &[u8]) + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let thunk: TwinUpdateThunk = Box::new(move |update_state, payload| {
            queue.push(QueuedCallback::Twin {
                update_state,
                payload: Some(payload),
                on_twin: None,
            });
        });
        core.ll.set_twin_callback(Some(thunk))?;
        core.callbacks.twin = Some(Arc::new(handler));
        Ok(())
    }

    pub fn clear_twin_callback(&self) -> Result<(), ClientError> {
        let mut core = lock_core(&self.core);
        core.ll.set_twin_callback(None)?;
        core.callbacks.twin = None;
        Ok(())
    }

    /// Requests the full twin document. The callback fires exactly once,
    /// with the payload or with `None` on failure or teardown.
    pub fn get_twin_async(
        &self,
        on_twin: impl FnOnce(TwinUpdateState, Option<Vec<u8>>) + Send + 'static,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let on_twin: GetTwinCallback = Box::new(on_twin);
        let thunk: GetTwinThunk = Box::new(move |update_state, payload| {
            queue.push(QueuedCallback::Twin {
                update_state,
                payload,
                on_twin: Some(on_twin),
            });
        });
        core.ll.get_twin(thunk)?;
        Ok(())
    }

    /// Writes the reported half of the twin. The callback receives the
    /// service status code, or a negative code if the write was aborted by
    /// teardown.
    pub fn send_reported_state(
        &self,
        reported_state: &[u8],
        on_ack: Option<ReportedStateCallback>,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let thunk = on_ack.map(|cb| {
            let queue = self.queue.clone();
            let thunk: ReportedStateThunk = Box::new(move |status| {
                queue.push(QueuedCallback::ReportedState {
                    status,
                    on_ack: Some(cb),
                });
            });
            thunk
        });
        core.ll.send_reported_state(reported_state.to_vec(), thunk)?;
        Ok(())
    }

    /// Registers the synchronous method handler: it returns the reply,
    /// which the dispatch worker ships back through the lower layer (a
    /// reply with an empty payload sends nothing).
    pub fn set_method_callback(
        &self,
        handler: impl Fn(&str, &[u8]) -> MethodReply + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let thunk: MethodThunk = Box::new(move |name, payload, id| {
            // A null payload from the service surfaces as `{}` so the
            // handler always sees a valid JSON document.
            let payload = if payload.is_empty() {
                METHOD_EMPTY_PAYLOAD.to_vec()
            } else {
                payload.to_vec()
            };
            queue.push(QueuedCallback::Method {
                name: name.to_owned(),
                payload,
                id,
            });
        });
        core.ll.set_method_callback(Some(thunk))?;
        core.callbacks.method = Some(Arc::new(handler));
        core.callbacks.method_ex = None;
        Ok(())
    }

    /// Registers the asynchronous method handler: it receives the method id
    /// and replies later via
    /// [`device_method_response`](Client::device_method_response).
    pub fn set_method_callback_ex(
        &self,
        handler: impl Fn(&str, &[u8], MethodId) + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let queue = self.queue.clone();
        let thunk: MethodThunk = Box::new(move |name, payload, id| {
            queue.push(QueuedCallback::MethodEx {
                name: name.to_owned(),
                payload: payload.to_vec(),
                id,
            });
        });
        core.ll.set_method_callback(Some(thunk))?;
        core.callbacks.method_ex = Some(Arc::new(handler));
        core.callbacks.method = None;
        Ok(())
    }

    pub fn clear_method_callback(&self) -> Result<(), ClientError> {
        let mut core = lock_core(&self.core);
        core.ll.set_method_callback(None)?;
        core.callbacks.method = None;
        core.callbacks.method_ex = None;
        Ok(())
    }

    /// Ships the reply to a method call received through the asynchronous
    /// handler.
    pub fn device_method_response(
        &self,
        method: MethodId,
        payload: &[u8],
        status: i32,
    ) -> Result<(), ClientError> {
        lock_core(&self.core).ll.method_response(method, payload, status)?;
        Ok(())
    }

    /// Uploads `content` to the named blob in a detached task. The content
    /// is copied before this returns, so the caller may reuse its buffer
    /// immediately. The blob path is re-entrant, so the upload runs without
    /// the serialization lock and never stalls the dispatch worker.
    pub fn upload_to_blob_async(
        &self,
        destination_file_name: &str,
        content: &[u8],
        on_result: Option<UploadCallback>,
    ) -> Result<(), ClientError> {
        if destination_file_name.is_empty() {
            return Err(ClientError::InvalidArgument("destination file name is empty"));
        }
        // The dispatch worker is what runs the garbage sweep over detached
        // tasks, so it is needed even though the upload has its own thread.
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let blob = core
            .ll
            .blob_client()
            .ok_or(ClientError::Unsupported("blob upload"))?;
        let destination = destination_file_name.to_owned();
        let content = content.to_vec();
        core.tasks.add_task(TaskKind::BlobUpload, move || {
            let outcome = match blob.upload(&destination, &content) {
                Ok(()) => UploadOutcome::Ok,
                Err(e) => {
                    log::error!("blob upload of `{destination}` failed: {e}");
                    UploadOutcome::Error
                }
            };
            if let Some(on_result) = on_result {
                on_result(outcome);
            }
        })
    }

    /// Uploads a blob whose content is produced block-by-block by `source`,
    /// in a detached task. `source.complete` receives the terminal outcome.
    pub fn upload_blocks_to_blob_async(
        &self,
        destination_file_name: &str,
        source: impl UploadBlockSource + 'static,
    ) -> Result<(), ClientError> {
        if destination_file_name.is_empty() {
            return Err(ClientError::InvalidArgument("destination file name is empty"));
        }
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let blob = core
            .ll
            .blob_client()
            .ok_or(ClientError::Unsupported("blob upload"))?;
        let destination = destination_file_name.to_owned();
        let mut source = source;
        core.tasks.add_task(TaskKind::BlobUploadMultiblock, move || {
            let outcome = match blob.upload_blocks(&destination, &mut source) {
                Ok(()) => UploadOutcome::Ok,
                Err(e) => {
                    log::error!("multi-block upload of `{destination}` failed: {e}");
                    UploadOutcome::Error
                }
            };
            source.complete(outcome);
        })
    }

    /// Invokes a method on another device or module, in a detached task.
    pub fn invoke_method_async(
        &self,
        target: MethodTarget,
        method_name: &str,
        payload: &[u8],
        timeout: Duration,
        on_result: Option<MethodInvokeCallback>,
    ) -> Result<(), ClientError> {
        if method_name.is_empty() {
            return Err(ClientError::InvalidArgument("method name is empty"));
        }
        if target.device_id().is_empty() {
            return Err(ClientError::InvalidArgument("target device id is empty"));
        }
        self.start_worker_if_needed()?;
        let mut core = lock_core(&self.core);
        let invoker = core
            .ll
            .method_invoker()
            .ok_or(ClientError::Unsupported("method invocation"))?;
        let method_name = method_name.to_owned();
        let payload = payload.to_vec();
        core.tasks.add_task(TaskKind::MethodInvoke, move || {
            let result = invoker
                .invoke(&target, &method_name, &payload, timeout)
                .map_err(ClientError::from);
            if let Some(on_result) = on_result {
                on_result(result);
            }
        })
    }

    /// Settles an inbound message whose handler returned
    /// [`MessageDisposition::AsyncAck`].
    pub fn send_message_disposition(
        &self,
        message: &Message,
        disposition: MessageDisposition,
    ) -> Result<(), ClientError> {
        self.start_worker_if_needed()?;
        lock_core(&self.core).ll.send_message_disposition(message, disposition)?;
        Ok(())
    }

    /// Sets a named option.
    ///
    /// Two names are owned by this layer: [`OPTION_DO_WORK_FREQUENCY_IN_MS`]
    /// (`1..=100`, and strictly below the recorded message timeout) and
    /// [`OPTION_MESSAGE_TIMEOUT`] (strictly above the tick period). A
    /// rejected value leaves both settings unchanged. Every other name is
    /// forwarded verbatim to the lower layer.
    pub fn set_option(&self, name: &str, value: OptionValue) -> Result<(), ClientError> {
        if name.is_empty() {
            return Err(ClientError::InvalidArgument("option name is empty"));
        }
        let mut core = lock_core(&self.core);
        match name {
            OPTION_DO_WORK_FREQUENCY_IN_MS => {
                let v = value
                    .as_u64()
                    .ok_or(ClientError::InvalidArgument("do_work_freq_ms takes an unsigned integer"))?;
                if v == 0 || v > DO_WORK_MAX_FREQ_MS {
                    return Err(ClientError::InvalidArgument(
                        "do_work_freq_ms must be between 1 and 100",
                    ));
                }
                if core.message_timeout_ms.is_some_and(|timeout| v >= timeout) {
                    return Err(ClientError::InvalidArgument(
                        "do_work_freq_ms must stay below messageTimeout",
                    ));
                }
                core.do_work_freq_ms = v;
                Ok(())
            }
            OPTION_MESSAGE_TIMEOUT => {
                let v = value
                    .as_u64()
                    .ok_or(ClientError::InvalidArgument("messageTimeout takes an unsigned integer"))?;
                if v <= core.do_work_freq_ms {
                    return Err(ClientError::InvalidArgument(
                        "messageTimeout must exceed do_work_freq_ms",
                    ));
                }
                core.ll.set_option(name, &value)?;
                core.message_timeout_ms = Some(v);
                Ok(())
            }
            _ => {
                core.ll.set_option(name, &value)?;
                Ok(())
            }
        }
    }

    /// Current worker tick period in milliseconds.
    pub fn do_work_frequency_ms(&self) -> u64 {
        lock_core(&self.core).do_work_freq_ms
    }

    /// Tears the client down: detaches from a shared transport, stops and
    /// joins the worker, waits for every detached task, destroys the lower
    /// layer, and fires each still-pending one-shot callback with its
    /// terminal value. Dropping the handle does the same.
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        // Detach from the shared transport first so its worker stops
        // ticking this client.
        let join_transport = match &self.transport {
            Some(transport) => transport.signal_end_worker(&self.core),
            None => false,
        };

        let worker = {
            let mut core = lock_core(&self.core);
            core.stop = true;
            core.worker.take()
        };
        if let Some(worker) = worker {
            if worker.join().is_err() {
                log::error!("dispatch worker panicked");
            }
        }

        if join_transport {
            if let Some(transport) = &self.transport {
                transport.join_worker();
            }
        }

        // Wait out the detached tasks, sleeping a tick between sweeps so
        // their threads get to finish instead of spinning against the lock.
        loop {
            let sleep_ms = {
                let mut core = lock_core(&self.core);
                core.tasks.gc_sweep();
                if core.tasks.is_empty() {
                    break;
                }
                core.do_work_freq_ms
            };
            thread::sleep(Duration::from_millis(sleep_ms));
        }

        // Destroy the lower layer. Its destroy contract fires every
        // still-pending one-shot thunk, and those records land in the
        // queue drained below.
        {
            let mut core = lock_core(&self.core);
            let ll = std::mem::replace(&mut core.ll, Box::new(ShutdownLowLevel));
            drop(core);
            drop(ll);
        }

        // Residual records: fire the one-shots with their recorded values,
        // drop the standing-handler kinds.
        let residual = self.queue.len();
        if residual > 0 {
            log::debug!("delivering {residual} residual callback records at teardown");
        }
        for record in self.queue.drain() {
            match record {
                QueuedCallback::Confirmation {
                    result,
                    on_confirmation: Some(on_confirmation),
                } => on_confirmation(result),
                QueuedCallback::ReportedState {
                    status,
                    on_ack: Some(on_ack),
                } => on_ack(status),
                QueuedCallback::Twin {
                    update_state,
                    payload,
                    on_twin: Some(on_twin),
                } => on_twin(update_state, payload),
                _ => {}
            }
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Placeholder engine installed during teardown so the real one can be
/// dropped at a deterministic point in the sequence.
struct ShutdownLowLevel;

impl LowLevelClient for ShutdownLowLevel {
    fn do_work(&mut self) {}

    fn send_event(
        &mut self,
        _message: Message,
        _on_confirmation: Option<ConfirmationThunk>,
    ) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn get_send_status(&self) -> SendStatus {
        SendStatus::Idle
    }

    fn set_message_callback(&mut self, _thunk: Option<MessageThunk>) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn set_input_message_callback(
        &mut self,
        _input_name: &str,
        _thunk: Option<MessageThunk>,
    ) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn set_connection_status_callback(
        &mut self,
        _thunk: Option<ConnectionStatusThunk>,
    ) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn set_retry_policy(&mut self, _policy: RetryPolicy, _timeout_secs: u64) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn retry_policy(&self) -> (RetryPolicy, u64) {
        (RetryPolicy::None, 0)
    }

    fn last_message_receive_time(&self) -> Option<SystemTime> {
        None
    }

    fn set_twin_callback(&mut self, _thunk: Option<TwinUpdateThunk>) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn get_twin(&mut self, _on_twin: GetTwinThunk) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn send_reported_state(
        &mut self,
        _state: Vec<u8>,
        _on_ack: Option<ReportedStateThunk>,
    ) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn set_method_callback(&mut self, _thunk: Option<MethodThunk>) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn method_response(
        &mut self,
        _method: MethodId,
        _payload: &[u8],
        _status: i32,
    ) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn send_message_disposition(
        &mut self,
        _message: &Message,
        _disposition: MessageDisposition,
    ) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }

    fn set_option(&mut self, _name: &str, _value: &OptionValue) -> Result<(), LowLevelError> {
        Err(LowLevelError::InvalidState("client torn down"))
    }
}
