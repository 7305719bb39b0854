//! Threaded convenience layer for hublink device and module clients.
//!
//! The lower-layer transport engines (MQTT, AMQP, HTTP, tunnelled) are
//! single-threaded and cooperatively scheduled: they must be ticked, and
//! they may only be entered by one thread at a time. This crate wraps such
//! an engine in a facade that is callable from any thread:
//!
//! * every lower-layer call is serialized under one lock per client;
//! * a background worker ticks the engine, sweeps finished detached tasks
//!   and dispatches user callbacks **outside** the lock, so a callback may
//!   re-enter the facade without deadlocking;
//! * blocking HTTP operations (blob upload, cross-device method invoke)
//!   run on short-lived detached tasks that never stall the engine tick;
//! * teardown delivers a terminal notification to every pending one-shot
//!   callback and joins every thread it started.
//!
//! [`Client`] is the shared core facade; [`DeviceClient`] and
//! [`ModuleClient`] are the per-kind surfaces. Several clients can share
//! one connection through a multiplexed [`Transport`].

pub mod config;
pub mod error;
pub mod lower;
pub mod message;
pub mod types;

mod callbacks;
mod client;
mod device;
mod module;
mod queue;
mod tasks;
mod transport;
mod worker;

pub use callbacks::{
    ConnectionStatusCallback, EventConfirmationCallback, GetTwinCallback, MessageCallback,
    MethodCallback, MethodCallbackEx, MethodInvokeCallback, ReportedStateCallback, TwinCallback,
    UploadCallback,
};
pub use client::{Client, OPTION_DO_WORK_FREQUENCY_IN_MS, OPTION_MESSAGE_TIMEOUT};
pub use device::DeviceClient;
pub use error::{ClientError, LowLevelError};
pub use message::Message;
pub use module::ModuleClient;
pub use transport::Transport;
pub use types::{
    BlockAction, ConfirmationResult, ConnectionStatus, ConnectionStatusReason, MessageDisposition,
    MethodId, MethodReply, MethodTarget, OptionValue, RetryPolicy, SendStatus, TwinUpdateState,
    UploadOutcome,
};
