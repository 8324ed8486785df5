use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpaError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Authentication failed (status {status}): {message}")]
    AuthenticationError { status: u16, message: String },

    #[error("Course data request failed (status {status}): {message}")]
    TransportError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Course record is missing required field '{field}'")]
    MissingFieldError { field: String },

    #[error("Course record has invalid credit hours '{value}'")]
    InvalidHoursError { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Record,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GpaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GpaError::ApiError(_) | GpaError::TransportError { .. } => ErrorCategory::Network,
            GpaError::AuthenticationError { .. } => ErrorCategory::Authentication,
            GpaError::ConfigError { .. }
            | GpaError::ConfigValidationError { .. }
            | GpaError::InvalidConfigValueError { .. }
            | GpaError::MissingConfigError { .. } => ErrorCategory::Configuration,
            GpaError::MissingFieldError { .. } | GpaError::InvalidHoursError { .. } => {
                ErrorCategory::Record
            }
            GpaError::CsvError(_) | GpaError::IoError(_) | GpaError::SerializationError(_) => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單筆紀錄錯誤只會被跳過
            ErrorCategory::Record => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Authentication | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 單筆課程紀錄層級的錯誤，呼叫端應記錄後略過
    pub fn is_record_error(&self) -> bool {
        self.category() == ErrorCategory::Record
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check your network connection and that the student portal is reachable"
            }
            ErrorCategory::Authentication => "Verify your student ID and password",
            ErrorCategory::Configuration => {
                "Review the configuration file and command line arguments"
            }
            ErrorCategory::Record => "The course record was skipped; no action needed",
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GpaError::ApiError(_) => "Could not reach the student portal".to_string(),
            GpaError::AuthenticationError { .. } => {
                "Login failed: the portal rejected your credentials".to_string()
            }
            GpaError::TransportError { status, .. } => {
                format!("The portal refused to return course data (HTTP {})", status)
            }
            GpaError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GpaError>;
