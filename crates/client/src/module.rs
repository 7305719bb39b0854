//! Module-facing facade: adds output routes, input routes and cross-device
//! method invocation to the shared client core.

use std::time::{Duration, SystemTime};

use crate::callbacks::{
    EventConfirmationCallback, MethodInvokeCallback, ReportedStateCallback,
};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::lower::LowLevelProvider;
use crate::message::Message;
use crate::types::{
    ConnectionStatus, ConnectionStatusReason, MessageDisposition, MethodId, MethodReply,
    MethodTarget, OptionValue, RetryPolicy, SendStatus, TwinUpdateState,
};
use crate::Client;

/// A threaded hub client for one module identity.
pub struct ModuleClient {
    inner: Client,
}

impl ModuleClient {
    pub fn from_connection_string(
        connection_string: &str,
        provider: &dyn LowLevelProvider,
    ) -> Result<Self, ClientError> {
        Client::from_connection_string(connection_string, provider).map(|inner| ModuleClient { inner })
    }

    pub fn from_config(config: &ClientConfig, provider: &dyn LowLevelProvider) -> Result<Self, ClientError> {
        Client::from_config(config, provider).map(|inner| ModuleClient { inner })
    }

    /// Connects as the module this process runs as, resolved from the edge
    /// runtime's environment.
    pub fn from_environment(provider: &dyn LowLevelProvider) -> Result<Self, ClientError> {
        Client::from_environment(provider).map(|inner| ModuleClient { inner })
    }

    pub fn send_event(
        &self,
        message: Message,
        on_confirmation: Option<EventConfirmationCallback>,
    ) -> Result<(), ClientError> {
        self.inner.send_event(message, on_confirmation)
    }

    /// Sends a message out of a named module output.
    pub fn send_event_to_output(
        &self,
        message: Message,
        output_name: &str,
        on_confirmation: Option<EventConfirmationCallback>,
    ) -> Result<(), ClientError> {
        self.inner.send_event_to_output(message, output_name, on_confirmation)
    }

    pub fn send_status(&self) -> SendStatus {
        self.inner.send_status()
    }

    /// Registers the handler for messages arriving on a named input route.
    pub fn set_input_message_callback(
        &self,
        input_name: &str,
        handler: impl Fn(&Message) -> MessageDisposition + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.inner.set_input_message_callback(input_name, handler)
    }

    pub fn clear_input_message_callback(&self, input_name: &str) -> Result<(), ClientError> {
        self.inner.clear_input_message_callback(input_name)
    }

    pub fn set_message_callback(
        &self,
        handler: impl Fn(&Message) -> MessageDisposition + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.inner.set_message_callback(handler)
    }

    pub fn clear_message_callback(&self) -> Result<(), ClientError> {
        self.inner.clear_message_callback()
    }

    pub fn set_connection_status_callback(
        &self,
        handler: impl Fn(ConnectionStatus, ConnectionStatusReason) + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.inner.set_connection_status_callback(handler)
    }

    pub fn clear_connection_status_callback(&self) -> Result<(), ClientError> {
        self.inner.clear_connection_status_callback()
    }

    pub fn set_retry_policy(&self, policy: RetryPolicy, timeout_secs: u64) -> Result<(), ClientError> {
        self.inner.set_retry_policy(policy, timeout_secs)
    }

    pub fn retry_policy(&self) -> (RetryPolicy, u64) {
        self.inner.retry_policy()
    }

    pub fn last_message_receive_time(&self) -> Option<SystemTime> {
        self.inner.last_message_receive_time()
    }

    pub fn set_twin_callback(
        &self,
        handler: impl Fn(TwinUpdateState, &[u8]) + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.inner.set_twin_callback(handler)
    }

    pub fn clear_twin_callback(&self) -> Result<(), ClientError> {
        self.inner.clear_twin_callback()
    }

    pub fn get_twin_async(
        &self,
        on_twin: impl FnOnce(TwinUpdateState, Option<Vec<u8>>) + Send + 'static,
    ) -> Result<(), ClientError> {
        self.inner.get_twin_async(on_twin)
    }

    pub fn send_reported_state(
        &self,
        reported_state: &[u8],
        on_ack: Option<ReportedStateCallback>,
    ) -> Result<(), ClientError> {
        self.inner.send_reported_state(reported_state, on_ack)
    }

    pub fn set_method_callback(
        &self,
        handler: impl Fn(&str, &[u8]) -> MethodReply + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.inner.set_method_callback(handler)
    }

    pub fn set_method_callback_ex(
        &self,
        handler: impl Fn(&str, &[u8], MethodId) + Send + Sync + 'static,
    ) -> Result<(), ClientError> {
        self.inner.set_method_callback_ex(handler)
    }

    pub fn clear_method_callback(&self) -> Result<(), ClientError> {
        self.inner.clear_method_callback()
    }

    pub fn device_method_response(
        &self,
        method: MethodId,
        payload: &[u8],
        status: i32,
    ) -> Result<(), ClientError> {
        self.inner.device_method_response(method, payload, status)
    }

    /// Invokes a method on another device.
    pub fn invoke_device_method_async(
        &self,
        device_id: &str,
        method_name: &str,
        payload: &[u8],
        timeout: Duration,
        on_result: Option<MethodInvokeCallback>,
    ) -> Result<(), ClientError> {
        self.inner.invoke_method_async(
            MethodTarget::Device(device_id.to_owned()),
            method_name,
            payload,
            timeout,
            on_result,
        )
    }

    /// Invokes a method on a module of another device.
    pub fn invoke_module_method_async(
        &self,
        device_id: &str,
        module_id: &str,
        method_name: &str,
        payload: &[u8],
        timeout: Duration,
        on_result: Option<MethodInvokeCallback>,
    ) -> Result<(), ClientError> {
        self.inner.invoke_method_async(
            MethodTarget::Module {
                device_id: device_id.to_owned(),
                module_id: module_id.to_owned(),
            },
            method_name,
            payload,
            timeout,
            on_result,
        )
    }

    pub fn send_message_disposition(
        &self,
        message: &Message,
        disposition: MessageDisposition,
    ) -> Result<(), ClientError> {
        self.inner.send_message_disposition(message, disposition)
    }

    pub fn set_option(&self, name: &str, value: OptionValue) -> Result<(), ClientError> {
        self.inner.set_option(name, value)
    }

    pub fn do_work_frequency_ms(&self) -> u64 {
        self.inner.do_work_frequency_ms()
    }

    /// See [`Client::destroy`].
    pub fn destroy(self) {
        self.inner.destroy()
    }
}
