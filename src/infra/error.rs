use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("http client error: {message}")]
    Client { message: String },
}

impl InfraError {
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
