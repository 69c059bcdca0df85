use derive_builder::UninitializedFieldError;
use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpidemicError` and maps other errors to
/// convert to an `EpidemicError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpidemicError {
    /// A parameter is malformed or out of its domain. `field` names the offending input.
    InvalidParameter {
        field: &'static str,
        reason: String,
    },
    /// A compartment left the representable/sane range during integration. This means the
    /// step size is unstable for the given rates; retrying with the same input is pointless.
    NumericOverflow {
        time: f64,
        compartment: &'static str,
        value: f64,
    },
    /// The run would take more integration steps than allowed.
    StepLimitExceeded {
        steps: u64,
        limit: u64,
    },
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    EpidemicError(String),
}

impl EpidemicError {
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EpidemicError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field for `InvalidParameter` errors.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EpidemicError::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<io::Error> for EpidemicError {
    fn from(error: io::Error) -> Self {
        EpidemicError::IoError(error)
    }
}

impl From<serde_json::Error> for EpidemicError {
    fn from(error: serde_json::Error) -> Self {
        EpidemicError::JsonError(error)
    }
}

impl From<csv::Error> for EpidemicError {
    fn from(error: csv::Error) -> Self {
        EpidemicError::CSVError(error)
    }
}

impl From<UninitializedFieldError> for EpidemicError {
    fn from(error: UninitializedFieldError) -> Self {
        EpidemicError::invalid(error.field_name(), "field was not set")
    }
}

impl From<String> for EpidemicError {
    fn from(error: String) -> Self {
        EpidemicError::EpidemicError(error)
    }
}

impl From<&str> for EpidemicError {
    fn from(error: &str) -> Self {
        EpidemicError::EpidemicError(error.to_string())
    }
}

impl std::error::Error for EpidemicError {}

impl Display for EpidemicError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpidemicError::InvalidParameter { field, reason } => {
                write!(f, "invalid parameter `{field}`: {reason}")
            }
            EpidemicError::NumericOverflow {
                time,
                compartment,
                value,
            } => write!(
                f,
                "numeric overflow at t={time}: {compartment} reached {value}; \
                 try a smaller step size"
            ),
            EpidemicError::StepLimitExceeded { steps, limit } => write!(
                f,
                "run needs {steps} integration steps, more than the limit of {limit}"
            ),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
