use std::error;
use std::fmt;

/// Errors surfaced at the workstation boundary.
///
/// Only `InitFailed` requires action from the caller (retry the audio
/// initialization). Everything else is recoverable: the offending call is
/// dropped and the transport keeps running.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A trigger or play call arrived before the audio system was activated.
    NotInitialized,
    /// Opening the output stream failed.
    InitFailed(String),
    /// A drum or preset name that isn't part of the known set.
    UnknownVoice(String),
    /// A parameter that must not reach audio-graph construction.
    InvalidParameter { name: &'static str, value: f64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => write!(f, "audio system not initialized"),
            Error::InitFailed(reason) => write!(f, "audio initialization failed: {}", reason),
            Error::UnknownVoice(name) => write!(f, "unknown voice or preset {:?}", name),
            Error::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {}: {}", name, value)
            }
        }
    }
}

impl error::Error for Error {}
