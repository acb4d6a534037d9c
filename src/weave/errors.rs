use super::RegistrationError;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug)]
pub enum Error {
    /// Occurrence count must be at least 1
    InvalidOccurrenceCount {
        target: String,
        rule_key: String,
        count: usize,
    },

    /// Target is `native` or `abstract`
    NoMethodBody { target: String, rule_key: String },

    /// Rule registry refused the type information of the target
    Registration {
        target: String,
        rule_key: String,
        cause: RegistrationError,
    },

    /// A name or descriptor of the target could not be parsed
    MalformedTarget { target: String, reason: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Error::InvalidOccurrenceCount {
                target,
                rule_key,
                count,
            } => write!(
                f,
                "rule '{}' on {}: throw count must be at least 1 (got {})",
                rule_key, target, count
            ),
            Error::NoMethodBody { target, rule_key } => write!(
                f,
                "rule '{}' on {}: method has no body to rewrite",
                rule_key, target
            ),
            Error::Registration {
                target,
                rule_key,
                cause,
            } => write!(
                f,
                "rule '{}' on {}: failed to register type info: {}",
                rule_key, target, cause
            ),
            Error::MalformedTarget { target, reason } => {
                write!(f, "malformed target {}: {}", target, reason)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registration { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
