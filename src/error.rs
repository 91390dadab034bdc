use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("no API key: pass --api-key or set GEMINI_API_KEY")]
    MissingCredential,
    #[error("API key is malformed")]
    MalformedCredential,
    #[error("column '{0}' not found in roster")]
    UnknownColumn(String),
    #[error("roster has no header row")]
    EmptyRoster,
    #[error("generation service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("malformed reply from generation service: {0}")]
    MalformedReply(String),
    #[error("generation service returned no text")]
    EmptyReply,
    #[error("failed to read roster: {0}")]
    Roster(#[from] calamine::Error),
    #[error("failed to write spreadsheet: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;
