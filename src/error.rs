use thiserror::Error;

/// Why a literal was rejected before reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralFault {
    NotAnInteger,
    Zero,
    OutOfRange { nvars: u32 },
}

impl std::fmt::Display for LiteralFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnInteger => write!(f, "not an integer"),
            Self::Zero => write!(f, "zero is not a literal"),
            Self::OutOfRange { nvars } => write!(f, "magnitude exceeds {} variables", nvars),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid literal {literal}: {fault}")]
    InvalidLiteral { literal: String, fault: LiteralFault },

    #[error("engine initialisation failed: {0}")]
    EngineInitFailed(String),

    #[error("engine stopped at a propagation or decision limit")]
    ResourceLimitReached,

    #[error("session is closed")]
    SessionClosed,

    #[error("a solve is already running on this session")]
    ConcurrentSolve,
}

impl SessionError {
    pub fn invalid_literal(literal: impl ToString, fault: LiteralFault) -> Self {
        Self::InvalidLiteral {
            literal: literal.to_string(),
            fault,
        }
    }

    pub fn is_invalid_literal(&self) -> bool {
        matches!(self, Self::InvalidLiteral { .. })
    }
}
