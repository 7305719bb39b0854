//! Vocabulary shared between the facade, the dispatch worker and the
//! lower-layer interface.

/// Terminal outcome delivered to a send-event confirmation callback.
///
/// Exactly one of these reaches the callback for every accepted send:
/// [`Ok`](ConfirmationResult::Ok) or [`Error`](ConfirmationResult::Error)
/// from the transport, [`MessageTimeout`](ConfirmationResult::MessageTimeout)
/// when the per-message timeout elapsed, or
/// [`BecauseDestroy`](ConfirmationResult::BecauseDestroy) when the client was
/// torn down while the message was still pending.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfirmationResult {
    Ok,
    BecauseDestroy,
    MessageTimeout,
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Authenticated,
    Unauthenticated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatusReason {
    ExpiredSasToken,
    DeviceDisabled,
    BadCredential,
    RetryExpired,
    NoNetwork,
    CommunicationError,
    Ok,
}

/// Whether a twin payload is the full document or a desired-section delta.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TwinUpdateState {
    Complete,
    Partial,
}

/// Snapshot of the lower layer's outbound queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SendStatus {
    Idle,
    Busy,
}

/// Reconnect policy, forwarded verbatim to the lower layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    None,
    Immediate,
    Interval,
    LinearBackoff,
    ExponentialBackoff,
    #[default]
    ExponentialBackoffWithJitter,
    Random,
}

/// How an inbound message was settled by the application.
///
/// [`AsyncAck`](MessageDisposition::AsyncAck) defers settlement; the
/// application must later call `send_message_disposition` with one of the
/// other variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageDisposition {
    Accepted,
    Rejected,
    Abandoned,
    AsyncAck,
}

/// Opaque token correlating an inbound method call with its response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodId(u64);

impl MethodId {
    pub fn new(raw: u64) -> Self {
        MethodId(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Status and payload of a completed method call.
///
/// Returned by synchronous method handlers (device side) and by
/// cross-device method invocations (caller side).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodReply {
    pub status: i32,
    pub payload: Vec<u8>,
}

/// Typed option value.
///
/// The option name determines which variant a consumer expects; a mismatch
/// is an invalid-argument error at the layer that owns the option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    U32(u32),
    U64(u64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl OptionValue {
    /// Numeric coercion used by the integer-valued core options.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            OptionValue::U32(v) => Some(u64::from(*v)),
            OptionValue::U64(v) => Some(*v),
            _ => None,
        }
    }
}

/// Terminal outcome of a blob upload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Ok,
    Error,
}

/// One step of a multi-block upload, produced by the application's
/// block source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockAction {
    /// Upload this block and ask for another.
    Block(Vec<u8>),
    /// All data produced; finish the upload.
    Done,
    /// Abandon the upload.
    Abort,
}

/// Target of a cross-device method invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodTarget {
    Device(String),
    Module { device_id: String, module_id: String },
}

impl MethodTarget {
    pub fn device_id(&self) -> &str {
        match self {
            MethodTarget::Device(id) => id,
            MethodTarget::Module { device_id, .. } => device_id,
        }
    }
}
