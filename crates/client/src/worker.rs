//! The dispatch worker: drives the lower-layer tick under the serialization
//! lock and fires user callbacks outside it.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::callbacks::CallbackSnapshot;
use crate::client::{lock_core, ClientCore, DO_WORK_FREQ_DEFAULT_MS};
use crate::queue::{PendingCallbacks, QueuedCallback};
use crate::types::MessageDisposition;

pub(crate) fn spawn_client_worker(
    core: Arc<Mutex<ClientCore>>,
    queue: PendingCallbacks,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("hublink-client-worker".to_owned())
        .spawn(move || worker_loop(core, queue))
}

/// The stand-alone client's worker loop.
///
/// Per tick: under the lock, check the stop flag, run the lower-layer tick
/// (its thunks enqueue records), sweep finished detached tasks, snapshot
/// the standing handlers and move the queue out; then, with the lock
/// released, dispatch the moved records and sleep for the tick period.
fn worker_loop(core: Arc<Mutex<ClientCore>>, queue: PendingCallbacks) {
    let mut sleep_ms = DO_WORK_FREQ_DEFAULT_MS;
    loop {
        let snapshot;
        let records;
        {
            let mut guard = lock_core(&core);
            if guard.stop {
                break;
            }
            guard.ll.do_work();
            guard.tasks.gc_sweep();
            snapshot = guard.callbacks.snapshot();
            records = queue.drain();
            sleep_ms = guard.do_work_freq_ms;
        }
        dispatch_callbacks(&core, &snapshot, records);
        thread::sleep(Duration::from_millis(sleep_ms));
    }
}

/// One multiplexed tick for a client driven by a shared transport's worker.
///
/// The per-client lower layer is not ticked here: the shared engine's
/// `do_work` already advanced protocol state for every attached client.
pub(crate) fn multiplexed_tick(core: &Arc<Mutex<ClientCore>>, queue: &PendingCallbacks) {
    let snapshot;
    let records;
    {
        let mut guard = lock_core(core);
        guard.tasks.gc_sweep();
        snapshot = guard.callbacks.snapshot();
        records = queue.drain();
    }
    dispatch_callbacks(core, &snapshot, records);
}

/// Fires user callbacks for a batch of moved-out records. Runs without the
/// serialization lock, so a callback may re-enter the facade; the
/// method-response and disposition follow-ups re-acquire the lock for the
/// duration of their single lower-layer call.
fn dispatch_callbacks(
    core: &Arc<Mutex<ClientCore>>,
    snapshot: &CallbackSnapshot,
    records: VecDeque<QueuedCallback>,
) {
    for record in records {
        match record {
            QueuedCallback::Twin {
                update_state,
                payload,
                on_twin,
            } => {
                if let Some(on_twin) = on_twin {
                    on_twin(update_state, payload);
                } else if let Some(handler) = &snapshot.twin {
                    handler(update_state, payload.as_deref().unwrap_or(&[]));
                }
            }
            QueuedCallback::Confirmation {
                result,
                on_confirmation,
            } => {
                if let Some(on_confirmation) = on_confirmation {
                    on_confirmation(result);
                }
            }
            QueuedCallback::ReportedState { status, on_ack } => {
                if let Some(on_ack) = on_ack {
                    on_ack(status);
                }
            }
            QueuedCallback::ConnectionStatus { status, reason } => {
                if let Some(handler) = &snapshot.connection_status {
                    handler(status, reason);
                }
            }
            QueuedCallback::Method { name, payload, id } => {
                if let Some(handler) = &snapshot.method {
                    let reply = handler(&name, &payload);
                    if !reply.payload.is_empty() {
                        let mut guard = lock_core(core);
                        if let Err(e) = guard.ll.method_response(id, &reply.payload, reply.status) {
                            log::error!("method response for `{name}` failed: {e}");
                        }
                    }
                }
            }
            QueuedCallback::MethodEx { name, payload, id } => {
                if let Some(handler) = &snapshot.method_ex {
                    handler(&name, &payload, id);
                }
            }
            QueuedCallback::Message { message } => {
                if let Some(handler) = &snapshot.message {
                    let disposition = handler(&message);
                    send_disposition(core, &message, disposition);
                }
            }
            QueuedCallback::InputMessage {
                input_name,
                message,
                handler,
            } => {
                let disposition = handler(&message);
                if disposition == MessageDisposition::AsyncAck {
                    continue;
                }
                let mut guard = lock_core(core);
                if let Err(e) = guard.ll.send_message_disposition(&message, disposition) {
                    log::error!("disposition for input `{input_name}` failed: {e}");
                }
            }
        }
    }
}

fn send_disposition(core: &Arc<Mutex<ClientCore>>, message: &crate::message::Message, disposition: MessageDisposition) {
    if disposition == MessageDisposition::AsyncAck {
        return;
    }
    let mut guard = lock_core(core);
    if let Err(e) = guard.ll.send_message_disposition(message, disposition) {
        log::error!("message disposition failed: {e}");
    }
}
