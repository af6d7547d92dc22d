use super::params::CalculationFault;
use super::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum IncentiveError {
    #[error("subject '{subject}' cannot apply on building '{building}'")]
    InvalidCombination { subject: String, building: String },
    #[error("unknown intervention '{0}'")]
    UnknownIntervention(String),
    #[error("unknown subject type '{0}'")]
    UnknownSubject(String),
    #[error("unknown building category '{0}'")]
    UnknownBuilding(String),
    #[error("unknown operator type '{0}'")]
    UnknownOperator(String),
    #[error(transparent)]
    Calculation(#[from] CalculationFault),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl IncentiveError {
    /// Whether the caller supplied something the engine cannot use.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, IncentiveError::InvalidCombination { .. })
    }
}
