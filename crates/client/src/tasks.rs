//! Registry of detached worker tasks for blocking HTTP operations.
//!
//! Blob uploads and cross-device method invocations block for the duration
//! of an HTTP exchange, which must not stall the cooperative lower-layer
//! tick. Each one runs on its own short-lived thread; a record in this
//! registry tracks the thread until the garbage sweep joins and unlinks it.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::ClientError;

#[derive(Copy, Clone, Debug)]
pub(crate) enum TaskKind {
    BlobUpload,
    BlobUploadMultiblock,
    MethodInvoke,
}

impl TaskKind {
    fn thread_name(&self) -> &'static str {
        match self {
            TaskKind::BlobUpload => "hublink-blob-upload",
            TaskKind::BlobUploadMultiblock => "hublink-blob-upload-mb",
            TaskKind::MethodInvoke => "hublink-method-invoke",
        }
    }
}

pub(crate) struct TaskRecord {
    kind: TaskKind,
    /// Flipped by the task just before it exits. Guarded by its own mutex:
    /// the task may flip it after the sweep inspected the record but before
    /// the sweep released it, and this bounds that race to the flag.
    collectible: Mutex<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskRecord {
    fn mark_collectible(&self) {
        *self.collectible.lock().expect("task collectible Mutex is poisoned") = true;
    }
}

/// In-flight detached tasks of one client. Mutated only under the client's
/// serialization lock.
#[derive(Default)]
pub(crate) struct TaskRegistry {
    records: Vec<Arc<TaskRecord>>,
}

impl TaskRegistry {
    /// Links a new record and spawns its task. On spawn failure the record
    /// is unlinked again and the error returned; the caller is still under
    /// the lock, so nothing else can have observed it.
    pub(crate) fn add_task(
        &mut self,
        kind: TaskKind,
        body: impl FnOnce() + Send + 'static,
    ) -> Result<(), ClientError> {
        let record = Arc::new(TaskRecord {
            kind,
            collectible: Mutex::new(false),
            handle: Mutex::new(None),
        });
        self.records.push(Arc::clone(&record));

        let task_record = Arc::clone(&record);
        let spawned = thread::Builder::new()
            .name(kind.thread_name().to_owned())
            .spawn(move || {
                body();
                task_record.mark_collectible();
            });
        match spawned {
            Ok(handle) => {
                *record.handle.lock().expect("task handle Mutex is poisoned") = Some(handle);
                Ok(())
            }
            Err(e) => {
                log::error!("failed to spawn {kind:?} task: {e}");
                self.records.pop();
                Err(ClientError::TaskSpawn(e))
            }
        }
    }

    /// Joins and unlinks every record whose task has finished. Records
    /// whose task is still running are skipped.
    pub(crate) fn gc_sweep(&mut self) {
        self.records.retain(|record| {
            let collectible = *record
                .collectible
                .lock()
                .expect("task collectible Mutex is poisoned");
            if !collectible {
                return true;
            }
            if let Some(handle) = record.handle.lock().expect("task handle Mutex is poisoned").take() {
                if handle.join().is_err() {
                    log::error!("{:?} task panicked", record.kind);
                }
            }
            false
        });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
