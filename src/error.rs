//! Error types for schema prompting, validation and daemon access.

use thiserror::Error;

/// A schema document that falls outside the subset the prompter understands.
///
/// Every variant carries a JSON Pointer (RFC 6901) to the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema at {path} must be an object, got {actual}")]
    NotAnObject { path: String, actual: String },

    #[error("schema at {path} has no type and no const, enum, oneOf or anyOf")]
    MissingType { path: String },

    #[error("unsupported type {value} at {path}")]
    UnsupportedType { path: String, value: String },

    #[error("invalid '{keyword}' at {path}: expected {expected}, got {actual}")]
    InvalidKeyword {
        path: String,
        keyword: String,
        expected: String,
        actual: String,
    },

    #[error("object schema at {path} has no properties")]
    MissingProperties { path: String },

    #[error("array schema at {path} has no items")]
    MissingItems { path: String },

    #[error("variant {index} at {path} has no title")]
    UntitledVariant { path: String, index: usize },
}

/// Errors raised while collecting a value from a schema.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The input source ran dry before the value was complete.
    #[error("input ended before '{prompt}' was answered")]
    Input { prompt: String },

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PromptError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PromptError::Schema(_) => 2,
            PromptError::Input { .. } => 1,
            PromptError::Io(_) => 3,
        }
    }
}

/// Errors during validation of a collected value.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<ValidationIssue> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationIssue {
    /// JSON Pointer to the invalid value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "/: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors talking to the daemon.
#[cfg(feature = "remote")]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid JSON from {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("incompatible versions {server} (client version {client})")]
    IncompatibleVersion { server: String, client: String },

    #[error("thing '{thing}' has no channel '{channel}'")]
    UnknownChannel { thing: String, channel: String },
}

#[cfg(feature = "remote")]
impl ClientError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Connect { .. } | ClientError::Network { .. } => 3,
            ClientError::UnknownChannel { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_error_exit_codes() {
        let err = PromptError::Schema(SchemaError::MissingItems {
            path: "/properties/hosts".into(),
        });
        assert_eq!(err.exit_code(), 2);

        let err = PromptError::Input {
            prompt: "port".into(),
        };
        assert_eq!(err.exit_code(), 1);

        let err = PromptError::Io(std::io::Error::other("broken pipe"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError::UntitledVariant {
            path: "/properties/auth/oneOf".into(),
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "variant 2 at /properties/auth/oneOf has no title"
        );
    }

    #[test]
    fn validation_issue_display() {
        let issue = ValidationIssue {
            path: "/port".into(),
            message: "\"x\" is not of type \"integer\"".into(),
        };
        assert_eq!(issue.to_string(), "/port: \"x\" is not of type \"integer\"");

        let root = ValidationIssue {
            path: String::new(),
            message: "\"name\" is a required property".into(),
        };
        assert_eq!(root.to_string(), "/: \"name\" is a required property");
    }

    #[cfg(feature = "remote")]
    #[test]
    fn client_error_exit_codes() {
        let err = ClientError::IncompatibleVersion {
            server: "0.2".into(),
            client: "0.1".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = ClientError::Status {
            method: "GET".into(),
            url: "http://localhost:9876/api/bridges/x".into(),
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }
}
