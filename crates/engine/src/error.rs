use std::fmt::{Display, Formatter};

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Why a submitted video reference was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    Empty,
    InvalidDomain,
}

impl ValidationReason {
    /// Stable machine-readable reason code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::InvalidDomain => "invalid-domain",
        }
    }

    /// User-facing message shown next to the URL field.
    pub fn message(self) -> &'static str {
        match self {
            Self::Empty => "Paste a YouTube URL to begin.",
            Self::InvalidDomain => "Please enter a valid YouTube link (youtube.com or youtu.be).",
        }
    }
}

/// Recoverable rejection of a submitted video reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(reason: ValidationReason) -> Self {
        Self { reason }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason.message())
    }
}

impl std::error::Error for ValidationError {}

/// Errors produced by studio commands and configuration loading.
#[derive(Debug)]
pub enum StudioError {
    Validation(ValidationError),
    InvalidConfig { reason: String },
    ConfigParse(toml::de::Error),
    Serialization(serde_json::Error),
}

impl Display for StudioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidConfig { reason } => write!(f, "invalid studio config: {reason}"),
            Self::ConfigParse(err) => write!(f, "studio config could not be parsed ({err})"),
            Self::Serialization(err) => write!(f, "snapshot serialization failed ({err})"),
        }
    }
}

impl std::error::Error for StudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ConfigParse(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidConfig { .. } => None,
        }
    }
}

impl From<ValidationError> for StudioError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<toml::de::Error> for StudioError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse(value)
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
