use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirtableError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Airtable API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Field '{field}' not found on records of table {table}")]
    FieldNotFound { table: String, field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AirtableError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AirtableError::HttpError(e) if e.is_decode() => ErrorCategory::Data,
            AirtableError::HttpError(_) => ErrorCategory::Network,
            AirtableError::ApiError { .. } => ErrorCategory::Api,
            AirtableError::SerializationError(_) | AirtableError::FieldNotFound { .. } => {
                ErrorCategory::Data
            }
            AirtableError::IoError(_) => ErrorCategory::System,
            AirtableError::UrlError(_)
            | AirtableError::ConfigValidationError { .. }
            | AirtableError::MissingConfigError { .. }
            | AirtableError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AirtableError::HttpError(e) if e.is_timeout() || e.is_connect() => {
                ErrorSeverity::Medium
            }
            AirtableError::ApiError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            AirtableError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Status code of a rejected API call, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AirtableError::ApiError { status, .. } => Some(*status),
            AirtableError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AirtableError::ApiError { status, body } => match api_error_message(body) {
                Some(message) => format!("Airtable rejected the request ({}): {}", status, message),
                None => format!("Airtable rejected the request ({})", status),
            },
            AirtableError::HttpError(e) if e.is_timeout() => {
                "The request to Airtable timed out".to_string()
            }
            AirtableError::HttpError(e) if e.is_connect() => {
                "Could not connect to the Airtable API".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AirtableError::ApiError { status: 401, .. } => {
                "Check that AIRTABLE_PAT holds a valid personal access token"
            }
            AirtableError::ApiError { status: 403, .. } => {
                "Grant the token data.records:read scope and access to this base"
            }
            AirtableError::ApiError { status: 404, .. } => {
                "Verify the base id and the table id or name"
            }
            AirtableError::ApiError { status: 422, .. } => {
                "Check the filterByFormula syntax and that referenced fields exist"
            }
            AirtableError::ApiError { status: 429, .. } => {
                "Rate limited; wait a few seconds or raise --retries"
            }
            AirtableError::ApiError { .. } => "Retry later; the Airtable API may be unavailable",
            AirtableError::HttpError(_) => "Check network connectivity or raise --timeout-secs",
            AirtableError::FieldNotFound { .. } => {
                "Run the `fields` command to list the field names the table exposes"
            }
            AirtableError::SerializationError(_) => {
                "The response was not the expected list-records payload; check --api-url"
            }
            AirtableError::IoError(_) => "Check file paths and permissions",
            AirtableError::UrlError(_)
            | AirtableError::ConfigValidationError { .. }
            | AirtableError::MissingConfigError { .. }
            | AirtableError::InvalidConfigValueError { .. } => {
                "Fix the configuration file, environment variables or command-line flags"
            }
        }
    }
}

/// Extracts `error.message` (or a bare `error` string) from an Airtable error body.
pub fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(kind) => Some(kind.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .or_else(|| obj.get("type"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    }
}

pub type Result<T> = std::result::Result<T, AirtableError>;
