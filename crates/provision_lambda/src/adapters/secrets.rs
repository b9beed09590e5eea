pub trait CredentialStore {
    /// Fetch one secret string by identifier. Called once per cold start;
    /// the worker never refetches per message.
    fn fetch_secret(&self, secret_id: &str) -> Result<String, String>;
}
