pub trait RequestPublisher {
    /// Publish one message body to the configured topic and return the
    /// broker's message identifier.
    fn publish(&self, message_body: &str) -> Result<String, String>;
}
