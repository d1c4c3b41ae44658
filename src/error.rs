/// Errors produced while streaming a reply from the chat backend.
///
/// None of these reach a caller of [`crate::ChatSession::submit`]; the session
/// logs them and swaps the pending reply for [`crate::ERROR_MESSAGE`].
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("chat backend returned status {status}")]
    Status { status: u16 },

    /// The reply stream broke off mid-body.
    #[error("chat stream interrupted: {0}")]
    Stream(String),

    /// The reply body was not valid UTF-8.
    #[error("chat stream is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}
