use dialcast_core::AppError;
use rvoip_client_core::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum SipError {
    #[error("SIP client error: {0}")]
    Client(#[from] ClientError),

    #[error("Could not resolve gateway {0}")]
    Resolve(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Phone is not started")]
    NotStarted,

    #[error("Media error: {0}")]
    Media(String),
}

impl From<SipError> for AppError {
    fn from(err: SipError) -> Self {
        AppError::CallAttemptFailed(err.to_string())
    }
}
