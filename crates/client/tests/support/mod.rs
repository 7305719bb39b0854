//! Scripted lower-layer doubles shared by the integration tests.
//!
//! `MockLowLevel` stores the thunks the client registers and replays a
//! script of inbound events inside `do_work`, the way a real engine fires
//! its callbacks from inside its tick. Tests observe outbound traffic
//! (sends, method responses, dispositions, options) through the shared
//! `LlState` handle.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};

use hublink_client::config::{ClientConfig, DeviceConfig};
use hublink_client::lower::{
    BlobClient, ConfirmationThunk, ConnectionStatusThunk, GetTwinThunk, LowLevelClient,
    LowLevelProvider, MessageThunk, MethodInvoker, MethodThunk, ReportedStateThunk, SharedEngine,
    SharedEngineProvider, TwinUpdateThunk, UploadBlockSource, REPORTED_STATE_ABORTED,
};
use hublink_client::{
    BlockAction, ConfirmationResult, ConnectionStatus, ConnectionStatusReason, LowLevelError,
    Message, MessageDisposition, MethodId, MethodReply, MethodTarget, OptionValue, RetryPolicy,
    SendStatus, TwinUpdateState,
};

/// An inbound event the mock engine delivers on its next tick.
pub enum LlEvent {
    CompleteNextSend(ConfirmationResult),
    InboundMessage(Message),
    InboundInput(String, Message),
    InboundMethod {
        name: String,
        payload: Vec<u8>,
        id: MethodId,
    },
    TwinUpdate {
        state: TwinUpdateState,
        payload: Vec<u8>,
    },
    CompleteTwinRead {
        state: TwinUpdateState,
        payload: Option<Vec<u8>>,
    },
    CompleteReported(i32),
    ConnectionStatus(ConnectionStatus, ConnectionStatusReason),
}

#[derive(Default)]
pub struct LlState {
    // Registered thunks.
    message_thunk: Option<MessageThunk>,
    input_thunks: HashMap<String, MessageThunk>,
    connection_thunk: Option<ConnectionStatusThunk>,
    twin_thunk: Option<TwinUpdateThunk>,
    method_thunk: Option<MethodThunk>,
    // Pending one-shots, oldest first.
    pending_confirmations: VecDeque<ConfirmationThunk>,
    pending_twin_reads: VecDeque<GetTwinThunk>,
    pending_reported: VecDeque<ReportedStateThunk>,
    // Script of events to replay on the next tick.
    script: VecDeque<LlEvent>,
    // Observations.
    pub do_work_count: usize,
    pub sent: Vec<Message>,
    pub reported: Vec<Vec<u8>>,
    pub method_responses: Vec<(MethodId, Vec<u8>, i32)>,
    pub dispositions: Vec<(Message, MessageDisposition)>,
    pub options: Vec<(String, OptionValue)>,
    retry: (RetryPolicy, u64),
}

pub type SharedLl = Arc<Mutex<LlState>>;

pub fn new_state() -> SharedLl {
    Arc::new(Mutex::new(LlState::default()))
}

/// Queues an event for the engine's next tick.
pub fn script(state: &SharedLl, event: LlEvent) {
    state.lock().unwrap().script.push_back(event);
}

/// Spins until `predicate` holds on the state, panicking after 5 seconds.
pub fn wait_for(state: &SharedLl, what: &str, predicate: impl Fn(&LlState) -> bool) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        if predicate(&state.lock().unwrap()) {
            return;
        }
        assert!(std::time::Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

fn run_script(state: &mut LlState) {
    while let Some(event) = state.script.pop_front() {
        match event {
            LlEvent::CompleteNextSend(result) => {
                if let Some(thunk) = state.pending_confirmations.pop_front() {
                    thunk(result);
                }
            }
            LlEvent::InboundMessage(message) => {
                if let Some(thunk) = state.message_thunk.as_mut() {
                    thunk(message);
                }
            }
            LlEvent::InboundInput(input_name, message) => {
                if let Some(thunk) = state.input_thunks.get_mut(&input_name) {
                    thunk(message);
                }
            }
            LlEvent::InboundMethod { name, payload, id } => {
                if let Some(thunk) = state.method_thunk.as_mut() {
                    thunk(&name, &payload, id);
                }
            }
            LlEvent::TwinUpdate { state: update, payload } => {
                if let Some(thunk) = state.twin_thunk.as_mut() {
                    thunk(update, payload);
                }
            }
            LlEvent::CompleteTwinRead { state: update, payload } => {
                if let Some(thunk) = state.pending_twin_reads.pop_front() {
                    thunk(update, payload);
                }
            }
            LlEvent::CompleteReported(status) => {
                if let Some(thunk) = state.pending_reported.pop_front() {
                    thunk(status);
                }
            }
            LlEvent::ConnectionStatus(status, reason) => {
                if let Some(thunk) = state.connection_thunk.as_mut() {
                    thunk(status, reason);
                }
            }
        }
    }
}

pub struct MockLowLevel {
    state: SharedLl,
    blob: Option<Arc<MockBlobClient>>,
    invoker: Option<Arc<MockMethodInvoker>>,
}

impl LowLevelClient for MockLowLevel {
    fn do_work(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.do_work_count += 1;
        run_script(&mut state);
    }

    fn send_event(
        &mut self,
        message: Message,
        on_confirmation: Option<ConfirmationThunk>,
    ) -> Result<(), LowLevelError> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(message);
        if let Some(thunk) = on_confirmation {
            state.pending_confirmations.push_back(thunk);
        }
        Ok(())
    }

    fn get_send_status(&self) -> SendStatus {
        if self.state.lock().unwrap().pending_confirmations.is_empty() {
            SendStatus::Idle
        } else {
            SendStatus::Busy
        }
    }

    fn set_message_callback(&mut self, thunk: Option<MessageThunk>) -> Result<(), LowLevelError> {
        self.state.lock().unwrap().message_thunk = thunk;
        Ok(())
    }

    fn set_input_message_callback(
        &mut self,
        input_name: &str,
        thunk: Option<MessageThunk>,
    ) -> Result<(), LowLevelError> {
        let mut state = self.state.lock().unwrap();
        match thunk {
            Some(thunk) => {
                state.input_thunks.insert(input_name.to_owned(), thunk);
            }
            None => {
                state.input_thunks.remove(input_name);
            }
        }
        Ok(())
    }

    fn set_connection_status_callback(
        &mut self,
        thunk: Option<ConnectionStatusThunk>,
    ) -> Result<(), LowLevelError> {
        self.state.lock().unwrap().connection_thunk = thunk;
        Ok(())
    }

    fn set_retry_policy(&mut self, policy: RetryPolicy, timeout_secs: u64) -> Result<(), LowLevelError> {
        self.state.lock().unwrap().retry = (policy, timeout_secs);
        Ok(())
    }

    fn retry_policy(&self) -> (RetryPolicy, u64) {
        self.state.lock().unwrap().retry
    }

    fn last_message_receive_time(&self) -> Option<SystemTime> {
        None
    }

    fn set_twin_callback(&mut self, thunk: Option<TwinUpdateThunk>) -> Result<(), LowLevelError> {
        self.state.lock().unwrap().twin_thunk = thunk;
        Ok(())
    }

    fn get_twin(&mut self, on_twin: GetTwinThunk) -> Result<(), LowLevelError> {
        self.state.lock().unwrap().pending_twin_reads.push_back(on_twin);
        Ok(())
    }

    fn send_reported_state(
        &mut self,
        state: Vec<u8>,
        on_ack: Option<ReportedStateThunk>,
    ) -> Result<(), LowLevelError> {
        let mut ll = self.state.lock().unwrap();
        ll.reported.push(state);
        if let Some(thunk) = on_ack {
            ll.pending_reported.push_back(thunk);
        }
        Ok(())
    }

    fn set_method_callback(&mut self, thunk: Option<MethodThunk>) -> Result<(), LowLevelError> {
        self.state.lock().unwrap().method_thunk = thunk;
        Ok(())
    }

    fn method_response(
        &mut self,
        method: MethodId,
        payload: &[u8],
        status: i32,
    ) -> Result<(), LowLevelError> {
        self.state
            .lock()
            .unwrap()
            .method_responses
            .push((method, payload.to_vec(), status));
        Ok(())
    }

    fn send_message_disposition(
        &mut self,
        message: &Message,
        disposition: MessageDisposition,
    ) -> Result<(), LowLevelError> {
        self.state
            .lock()
            .unwrap()
            .dispositions
            .push((message.clone(), disposition));
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<(), LowLevelError> {
        self.state
            .lock()
            .unwrap()
            .options
            .push((name.to_owned(), value.clone()));
        Ok(())
    }

    fn blob_client(&self) -> Option<Arc<dyn BlobClient>> {
        self.blob.clone().map(|blob| blob as Arc<dyn BlobClient>)
    }

    fn method_invoker(&self) -> Option<Arc<dyn MethodInvoker>> {
        self.invoker.clone().map(|inv| inv as Arc<dyn MethodInvoker>)
    }
}

impl Drop for MockLowLevel {
    // The engine destroy contract: every pending one-shot fires with its
    // terminal abort value.
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap();
        for thunk in state.pending_confirmations.drain(..) {
            thunk(ConfirmationResult::BecauseDestroy);
        }
        for thunk in state.pending_twin_reads.drain(..) {
            thunk(TwinUpdateState::Complete, None);
        }
        for thunk in state.pending_reported.drain(..) {
            thunk(REPORTED_STATE_ABORTED);
        }
    }
}

/// Blob side channel with a configurable exchange duration and outcome.
pub struct MockBlobClient {
    pub delay: Duration,
    pub fail: bool,
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockBlobClient {
    pub fn instant() -> Arc<Self> {
        Arc::new(MockBlobClient {
            delay: Duration::ZERO,
            fail: false,
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(MockBlobClient {
            delay,
            fail: false,
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(MockBlobClient {
            delay: Duration::ZERO,
            fail: true,
            uploads: Mutex::new(Vec::new()),
        })
    }
}

impl BlobClient for MockBlobClient {
    fn upload(&self, destination: &str, content: &[u8]) -> Result<(), LowLevelError> {
        thread::sleep(self.delay);
        if self.fail {
            return Err(LowLevelError::Transport("simulated upload failure".into()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((destination.to_owned(), content.to_vec()));
        Ok(())
    }

    fn upload_blocks(
        &self,
        destination: &str,
        source: &mut dyn UploadBlockSource,
    ) -> Result<(), LowLevelError> {
        thread::sleep(self.delay);
        let mut content = Vec::new();
        loop {
            match source.next_block() {
                BlockAction::Block(block) => content.extend_from_slice(&block),
                BlockAction::Done => break,
                BlockAction::Abort => {
                    return Err(LowLevelError::InvalidState("upload aborted by the data source"))
                }
            }
        }
        if self.fail {
            return Err(LowLevelError::Transport("simulated upload failure".into()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((destination.to_owned(), content));
        Ok(())
    }
}

/// Method-invocation side channel returning a canned reply.
pub struct MockMethodInvoker {
    pub delay: Duration,
    pub reply: MethodReply,
    pub invocations: Mutex<Vec<(MethodTarget, String, Vec<u8>, Duration)>>,
}

impl MockMethodInvoker {
    pub fn replying(status: i32, payload: &[u8]) -> Arc<Self> {
        Arc::new(MockMethodInvoker {
            delay: Duration::ZERO,
            reply: MethodReply {
                status,
                payload: payload.to_vec(),
            },
            invocations: Mutex::new(Vec::new()),
        })
    }
}

impl MethodInvoker for MockMethodInvoker {
    fn invoke(
        &self,
        target: &MethodTarget,
        method_name: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<MethodReply, LowLevelError> {
        thread::sleep(self.delay);
        self.invocations.lock().unwrap().push((
            target.clone(),
            method_name.to_owned(),
            payload.to_vec(),
            timeout,
        ));
        Ok(self.reply.clone())
    }
}

/// Provider wiring one scripted engine into a client factory.
pub struct MockProvider {
    pub state: SharedLl,
    pub blob: Option<Arc<MockBlobClient>>,
    pub invoker: Option<Arc<MockMethodInvoker>>,
    pub configs: Mutex<Vec<ClientConfig>>,
}

impl MockProvider {
    pub fn new() -> Self {
        MockProvider {
            state: new_state(),
            blob: None,
            invoker: None,
            configs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_blob(blob: Arc<MockBlobClient>) -> Self {
        MockProvider {
            blob: Some(blob),
            ..Self::new()
        }
    }

    pub fn with_invoker(invoker: Arc<MockMethodInvoker>) -> Self {
        MockProvider {
            invoker: Some(invoker),
            ..Self::new()
        }
    }
}

impl LowLevelProvider for MockProvider {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn LowLevelClient>, LowLevelError> {
        self.configs.lock().unwrap().push(config.clone());
        Ok(Box::new(MockLowLevel {
            state: Arc::clone(&self.state),
            blob: self.blob.clone(),
            invoker: self.invoker.clone(),
        }))
    }
}

pub const CONNECTION_STRING: &str = "HostName=h.n;DeviceId=d;SharedAccessKey=k";

/// Shared engine double: each attached client gets its own scripted state,
/// and the engine's tick replays every attached client's script.
pub struct MockSharedEngine {
    states: Arc<Mutex<Vec<(String, SharedLl)>>>,
}

impl SharedEngine for MockSharedEngine {
    fn do_work(&mut self) {
        for (_, state) in self.states.lock().unwrap().iter() {
            run_script(&mut state.lock().unwrap());
        }
    }

    fn attach(&mut self, device: &DeviceConfig) -> Result<Box<dyn LowLevelClient>, LowLevelError> {
        let state = new_state();
        self.states
            .lock()
            .unwrap()
            .push((device.device_id.clone(), Arc::clone(&state)));
        Ok(Box::new(MockLowLevel {
            state,
            blob: None,
            invoker: None,
        }))
    }
}

pub struct MockEngineProvider {
    /// Attached per-device states, visible to the test.
    pub states: Arc<Mutex<Vec<(String, SharedLl)>>>,
}

impl MockEngineProvider {
    pub fn new() -> Self {
        MockEngineProvider {
            states: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The scripted state attached for `device_id`.
    pub fn state_of(&self, device_id: &str) -> SharedLl {
        self.states
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == device_id)
            .map(|(_, state)| Arc::clone(state))
            .expect("no engine state attached for device")
    }
}

impl SharedEngineProvider for MockEngineProvider {
    fn open(&self, _host_name: &str) -> Result<Box<dyn SharedEngine>, LowLevelError> {
        Ok(Box::new(MockSharedEngine {
            states: Arc::clone(&self.states),
        }))
    }
}
