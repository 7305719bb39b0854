//! The pending-callback queue: lower-layer thunks push typed records under
//! the serialization lock, the dispatch worker takes the whole queue in one
//! move and fires user callbacks outside it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::callbacks::{EventConfirmationCallback, GetTwinCallback, MessageCallback, ReportedStateCallback};
use crate::message::Message;
use crate::types::{ConfirmationResult, ConnectionStatus, ConnectionStatusReason, MethodId, TwinUpdateState};

/// A queued user-callback record.
pub(crate) enum QueuedCallback {
    /// Twin payload: a one-shot read result when `on_twin` is set,
    /// otherwise a desired-properties update for the standing handler.
    Twin {
        update_state: TwinUpdateState,
        payload: Option<Vec<u8>>,
        on_twin: Option<GetTwinCallback>,
    },
    /// Send confirmation; carries its one-shot callback because
    /// confirmations never go through the standing-handler table.
    Confirmation {
        result: ConfirmationResult,
        on_confirmation: Option<EventConfirmationCallback>,
    },
    /// Reported-state acknowledgement; one-shot, same rationale.
    ReportedState {
        status: i32,
        on_ack: Option<ReportedStateCallback>,
    },
    ConnectionStatus {
        status: ConnectionStatus,
        reason: ConnectionStatusReason,
    },
    /// Inbound method for the synchronous handler.
    Method {
        name: String,
        payload: Vec<u8>,
        id: MethodId,
    },
    /// Inbound method for the asynchronous handler.
    MethodEx {
        name: String,
        payload: Vec<u8>,
        id: MethodId,
    },
    Message {
        message: Message,
    },
    /// Inbound message on a named input route; carries the route's handler
    /// so dispatch does not depend on the table still holding it.
    InputMessage {
        input_name: String,
        message: Message,
        handler: MessageCallback,
    },
}

/// Shared handle to one client's pending-callback queue.
///
/// Pushes happen from lower-layer thunks, which only run while the
/// serialization lock is held; the worker drains by swapping the whole
/// deque out, so producers and the drainer never contend beyond the
/// constant-time head manipulation here.
#[derive(Clone)]
pub(crate) struct PendingCallbacks {
    records: Arc<Mutex<VecDeque<QueuedCallback>>>,
}

impl PendingCallbacks {
    pub(crate) fn new() -> Self {
        PendingCallbacks {
            records: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub(crate) fn push(&self, record: QueuedCallback) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(record);
    }

    /// Moves every queued record out, leaving an empty queue in place.
    pub(crate) fn drain(&self) -> VecDeque<QueuedCallback> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
