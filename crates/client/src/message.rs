use std::collections::HashMap;
use std::sync::Arc;

/// A hub message.
///
/// `Message` is a cheap-clone handle: clones share one allocation until a
/// builder method needs to write, so a message can flow into the lower
/// layer, through the callback queue and back into a disposition call
/// without copying its body.
#[derive(Clone, Debug)]
pub struct Message {
    inner: Arc<MessageInner>,
}

#[derive(Clone, Debug, Default)]
struct MessageInner {
    body: Vec<u8>,
    message_id: Option<String>,
    correlation_id: Option<String>,
    content_type: Option<String>,
    properties: HashMap<String, String>,
    output_name: Option<String>,
    input_name: Option<String>,
}

impl Message {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Message {
            inner: Arc::new(MessageInner {
                body: body.into(),
                ..MessageInner::default()
            }),
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.inner.body
    }

    pub fn message_id(&self) -> Option<&str> {
        self.inner.message_id.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.inner.correlation_id.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.inner.content_type.as_deref()
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.inner.properties
    }

    /// Name of the output route the message is addressed to, if any.
    pub fn output_name(&self) -> Option<&str> {
        self.inner.output_name.as_deref()
    }

    /// Name of the input route the message arrived on, if any.
    pub fn input_name(&self) -> Option<&str> {
        self.inner.input_name.as_deref()
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).message_id = Some(id.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).correlation_id = Some(id.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).content_type = Some(content_type.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner)
            .properties
            .insert(key.into(), value.into());
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).output_name = Some(name.into());
        self
    }

    pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).input_name = Some(name.into());
        self
    }

    /// True when both handles refer to the same underlying message.
    ///
    /// Lower layers correlate disposition calls against delivered inbound
    /// messages with this.
    pub fn same_handle(&self, other: &Message) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
