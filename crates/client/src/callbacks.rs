//! User callback types and the per-client registration table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::message::Message;
use crate::types::{
    ConfirmationResult, ConnectionStatus, ConnectionStatusReason, MessageDisposition, MethodId,
    MethodReply, TwinUpdateState, UploadOutcome,
};
use crate::error::ClientError;

/// One-shot confirmation for a sent event.
pub type EventConfirmationCallback = Box<dyn FnOnce(ConfirmationResult) + Send>;
/// One-shot acknowledgement for a reported-state write (service status
/// code, or negative for a local abort).
pub type ReportedStateCallback = Box<dyn FnOnce(i32) + Send>;
/// One-shot result of [`get_twin_async`](crate::Client::get_twin_async);
/// `None` payload means failure or teardown.
pub type GetTwinCallback = Box<dyn FnOnce(TwinUpdateState, Option<Vec<u8>>) + Send>;
/// One-shot outcome of a blob upload.
pub type UploadCallback = Box<dyn FnOnce(UploadOutcome) + Send>;
/// One-shot outcome of a cross-device method invocation.
pub type MethodInvokeCallback = Box<dyn FnOnce(Result<MethodReply, ClientError>) + Send>;

/// Standing receiver for desired-twin updates.
pub type TwinCallback = Arc<dyn Fn(TwinUpdateState, &[u8]) + Send + Sync>;
/// Standing receiver for connection-status transitions.
pub type ConnectionStatusCallback = Arc<dyn Fn(ConnectionStatus, ConnectionStatusReason) + Send + Sync>;
/// Standing synchronous method handler: returns the reply to ship.
pub type MethodCallback = Arc<dyn Fn(&str, &[u8]) -> MethodReply + Send + Sync>;
/// Standing asynchronous method handler: replies later via
/// [`device_method_response`](crate::Client::device_method_response).
pub type MethodCallbackEx = Arc<dyn Fn(&str, &[u8], MethodId) + Send + Sync>;
/// Standing receiver for inbound messages; the returned disposition is
/// shipped back unless it is [`MessageDisposition::AsyncAck`].
pub type MessageCallback = Arc<dyn Fn(&Message) -> MessageDisposition + Send + Sync>;

/// Standing handlers registered on the client. Written only under the
/// serialization lock; the dispatch worker reads through a [`snapshot`]
/// taken under the lock at the top of each dispatch pass.
///
/// [`snapshot`]: CallbackTable::snapshot
#[derive(Default)]
pub(crate) struct CallbackTable {
    pub(crate) twin: Option<TwinCallback>,
    pub(crate) connection_status: Option<ConnectionStatusCallback>,
    pub(crate) method: Option<MethodCallback>,
    pub(crate) method_ex: Option<MethodCallbackEx>,
    pub(crate) message: Option<MessageCallback>,
    /// Input-route handlers, keyed by route name. Kept for unregistration
    /// bookkeeping; dispatch uses the handler captured in the queue record.
    pub(crate) inputs: HashMap<String, MessageCallback>,
}

pub(crate) struct CallbackSnapshot {
    pub(crate) twin: Option<TwinCallback>,
    pub(crate) connection_status: Option<ConnectionStatusCallback>,
    pub(crate) method: Option<MethodCallback>,
    pub(crate) method_ex: Option<MethodCallbackEx>,
    pub(crate) message: Option<MessageCallback>,
}

impl CallbackTable {
    pub(crate) fn snapshot(&self) -> CallbackSnapshot {
        CallbackSnapshot {
            twin: self.twin.clone(),
            connection_status: self.connection_status.clone(),
            method: self.method.clone(),
            method_ex: self.method_ex.clone(),
            message: self.message.clone(),
        }
    }
}
