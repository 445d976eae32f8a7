use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Http Error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    StatusError { status: u16, body: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::StatusError { status: 404, .. })
    }
}
