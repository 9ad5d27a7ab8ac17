use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("browser's return value doesn't match the standard, {message}")]
    StandardMismatch { message: String },
    #[error("failed to {verb_prep} the local storage area")]
    FailedStorageOperation { verb_prep: String },
    #[error("failed to deliver runtime message `{message_type}`")]
    FailedMessageDelivery { message_type: String },

    #[error(transparent)]
    InvalidHostname { #[from] source: idna::Errors },
    #[error("stored data was written by an incompatible version")]
    UnsupportedVersion
}
