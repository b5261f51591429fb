use thiserror::Error;

#[derive(Error, Debug)]
pub enum CelnavError {
    #[error("Ephemeris data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Light-time iteration for {body} did not converge after {iterations} iterations")]
    ConvergenceFailure { body: String, iterations: usize },

    #[error("Unknown celestial body: {0}")]
    UnknownBody(String),

    #[error("Invalid reduction parameter: {0}")]
    InvalidReductionParameter(String),

    #[error("Invalid sight field: {0}")]
    InvalidSightField(String),

    #[error("Invalid sight type code: {0}")]
    InvalidSightType(i32),

    #[error("Invalid limb code: {0}")]
    InvalidLimb(i32),

    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),

    #[error("XML error: {0}")]
    XmlError(String),
}

impl From<hifitime::HifitimeError> for CelnavError {
    fn from(err: hifitime::HifitimeError) -> Self {
        CelnavError::InvalidEpoch(err.to_string())
    }
}

impl From<quick_xml::DeError> for CelnavError {
    fn from(err: quick_xml::DeError) -> Self {
        CelnavError::XmlError(err.to_string())
    }
}

impl From<quick_xml::SeError> for CelnavError {
    fn from(err: quick_xml::SeError) -> Self {
        CelnavError::XmlError(err.to_string())
    }
}

impl PartialEq for CelnavError {
    fn eq(&self, other: &Self) -> bool {
        use CelnavError::*;
        match (self, other) {
            (DataUnavailable(a), DataUnavailable(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,

            // io::Error is not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,

            (
                ConvergenceFailure {
                    body: a,
                    iterations: i,
                },
                ConvergenceFailure {
                    body: b,
                    iterations: j,
                },
            ) => a == b && i == j,
            (UnknownBody(a), UnknownBody(b)) => a == b,
            (InvalidReductionParameter(a), InvalidReductionParameter(b)) => a == b,
            (InvalidSightField(a), InvalidSightField(b)) => a == b,
            (InvalidSightType(a), InvalidSightType(b)) => a == b,
            (InvalidLimb(a), InvalidLimb(b)) => a == b,
            (InvalidEpoch(a), InvalidEpoch(b)) => a == b,
            (XmlError(a), XmlError(b)) => a == b,

            _ => false,
        }
    }
}
