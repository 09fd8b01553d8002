#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum RotationError {
    #[error("candidate store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("no eligible rotation{}", gateway_suffix(.gateway))]
    NoCandidates { gateway: Option<String> },
    #[error("all rotations for gateway {gateway} have a zero ratio")]
    DegenerateWeights { gateway: String },
    #[error("invalid rotation configuration: {0}")]
    InvalidConfiguration(String),
}

impl RotationError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Self::StoreUnavailable(err.to_string())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

fn gateway_suffix(gateway: &Option<String>) -> String {
    match gateway {
        Some(g) => format!(" for gateway {}", g),
        None => String::new(),
    }
}
