//! The lower-layer (LL) interface the convenience layer consumes.
//!
//! The LL is a single-threaded, cooperatively scheduled transport engine:
//! every call into it happens under the client's serialization lock, and it
//! invokes the thunks registered here only from inside [`LowLevelClient::do_work`]
//! (plus the destroy contract below). Implementations live outside this
//! crate, one per wire protocol, and are selected through a
//! [`LowLevelProvider`] passed to the client factories.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::config::{ClientConfig, DeviceConfig};
use crate::error::LowLevelError;
use crate::message::Message;
use crate::types::{
    BlockAction, ConfirmationResult, ConnectionStatus, ConnectionStatusReason, MessageDisposition,
    MethodId, MethodReply, MethodTarget, OptionValue, RetryPolicy, SendStatus, TwinUpdateState,
    UploadOutcome,
};

/// One-shot completion for a send.
pub type ConfirmationThunk = Box<dyn FnOnce(ConfirmationResult) + Send>;
/// One-shot acknowledgement for a reported-state write; the value is the
/// service status code, or [`REPORTED_STATE_ABORTED`] for a local abort.
pub type ReportedStateThunk = Box<dyn FnOnce(i32) + Send>;
/// One-shot result of a twin read; `None` payload means the read failed or
/// was aborted by teardown.
pub type GetTwinThunk = Box<dyn FnOnce(TwinUpdateState, Option<Vec<u8>>) + Send>;
/// Standing receiver for desired-twin updates.
pub type TwinUpdateThunk = Box<dyn FnMut(TwinUpdateState, Vec<u8>) + Send>;
/// Standing receiver for inbound method calls: name, payload, correlation id.
pub type MethodThunk = Box<dyn FnMut(&str, &[u8], MethodId) + Send>;
/// Standing receiver for inbound messages.
pub type MessageThunk = Box<dyn FnMut(Message) + Send>;
/// Standing receiver for connection-status transitions.
pub type ConnectionStatusThunk = Box<dyn FnMut(ConnectionStatus, ConnectionStatusReason) + Send>;

/// Status code handed to a pending [`ReportedStateThunk`] when the client is
/// destroyed before the service acknowledged the write. Negative so it can
/// never collide with an HTTP-shaped service status.
pub const REPORTED_STATE_ABORTED: i32 = -1;

/// A connected lower-layer engine for one logical device or module.
///
/// # Destroy contract
///
/// Dropping the engine fires every still-pending one-shot thunk exactly
/// once with its terminal abort value:
/// [`ConfirmationResult::BecauseDestroy`] for sends,
/// [`REPORTED_STATE_ABORTED`] for reported-state writes, and a `None`
/// payload for twin reads. An engine that returns `Err` from an operation
/// must drop the thunk it was given without firing it; the caller reports
/// the error synchronously instead.
pub trait LowLevelClient: Send {
    /// Advances protocol state; may invoke registered thunks synchronously.
    fn do_work(&mut self);

    fn send_event(
        &mut self,
        message: Message,
        on_confirmation: Option<ConfirmationThunk>,
    ) -> Result<(), LowLevelError>;

    fn get_send_status(&self) -> SendStatus;

    fn set_message_callback(&mut self, thunk: Option<MessageThunk>) -> Result<(), LowLevelError>;

    /// Registers (or, with `None`, unregisters) the receiver for one named
    /// input route.
    fn set_input_message_callback(
        &mut self,
        input_name: &str,
        thunk: Option<MessageThunk>,
    ) -> Result<(), LowLevelError>;

    fn set_connection_status_callback(
        &mut self,
        thunk: Option<ConnectionStatusThunk>,
    ) -> Result<(), LowLevelError>;

    fn set_retry_policy(&mut self, policy: RetryPolicy, timeout_secs: u64) -> Result<(), LowLevelError>;

    fn retry_policy(&self) -> (RetryPolicy, u64);

    fn last_message_receive_time(&self) -> Option<SystemTime>;

    fn set_twin_callback(&mut self, thunk: Option<TwinUpdateThunk>) -> Result<(), LowLevelError>;

    fn get_twin(&mut self, on_twin: GetTwinThunk) -> Result<(), LowLevelError>;

    fn send_reported_state(
        &mut self,
        state: Vec<u8>,
        on_ack: Option<ReportedStateThunk>,
    ) -> Result<(), LowLevelError>;

    fn set_method_callback(&mut self, thunk: Option<MethodThunk>) -> Result<(), LowLevelError>;

    fn method_response(
        &mut self,
        method: MethodId,
        payload: &[u8],
        status: i32,
    ) -> Result<(), LowLevelError>;

    fn send_message_disposition(
        &mut self,
        message: &Message,
        disposition: MessageDisposition,
    ) -> Result<(), LowLevelError>;

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<(), LowLevelError>;

    /// Shared handle to the engine's blob-upload side channel, when the
    /// transport provides one.
    ///
    /// The handle holds no client-visible state and is safe to call without
    /// the serialization lock; detached upload tasks capture it once and
    /// block inside it for the duration of the HTTP exchange.
    fn blob_client(&self) -> Option<Arc<dyn BlobClient>> {
        None
    }

    /// Shared handle to the engine's method-invocation side channel, when
    /// the transport provides one. Same locking contract as
    /// [`blob_client`](LowLevelClient::blob_client).
    fn method_invoker(&self) -> Option<Arc<dyn MethodInvoker>> {
        None
    }
}

/// Produces a block of upload data on demand.
///
/// A source that always ends with [`BlockAction::Done`] is a plain
/// streaming producer; returning [`BlockAction::Abort`] cancels the upload
/// mid-stream.
pub trait UploadBlockSource: Send {
    fn next_block(&mut self) -> BlockAction;

    /// Invoked once with the terminal outcome, after
    /// [`BlobClient::upload_blocks`] has returned.
    fn complete(&mut self, outcome: UploadOutcome) {
        let _ = outcome;
    }
}

/// Re-entrant blob-upload path. See [`LowLevelClient::blob_client`].
pub trait BlobClient: Send + Sync {
    fn upload(&self, destination: &str, content: &[u8]) -> Result<(), LowLevelError>;

    /// Pulls blocks out of `source` until it returns [`BlockAction::Done`]
    /// or [`BlockAction::Abort`]. The caller, not the implementation,
    /// delivers [`UploadBlockSource::complete`].
    fn upload_blocks(
        &self,
        destination: &str,
        source: &mut dyn UploadBlockSource,
    ) -> Result<(), LowLevelError>;
}

/// Re-entrant cross-device method invocation path. See
/// [`LowLevelClient::method_invoker`].
pub trait MethodInvoker: Send + Sync {
    fn invoke(
        &self,
        target: &MethodTarget,
        method_name: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<MethodReply, LowLevelError>;
}

/// Transport-provider selector: turns a resolved configuration into a live
/// engine. The embedding application supplies one per wire protocol.
pub trait LowLevelProvider {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn LowLevelClient>, LowLevelError>;
}

/// The multiplexed transport's own engine: one connection carrying several
/// logical clients.
pub trait SharedEngine: Send {
    /// Advances protocol state for every attached client; their registered
    /// thunks may fire synchronously during this call.
    fn do_work(&mut self);

    /// Creates the per-client engine for one more device on this
    /// connection.
    fn attach(&mut self, device: &DeviceConfig) -> Result<Box<dyn LowLevelClient>, LowLevelError>;
}

/// Selector for shared-transport engines.
pub trait SharedEngineProvider {
    fn open(&self, host_name: &str) -> Result<Box<dyn SharedEngine>, LowLevelError>;
}
