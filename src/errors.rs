use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArbError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArbError {
    /// Negative reserve, or an empty side on a pool that has to be swapped against.
    #[error("invalid reserve {name}: {value}")]
    InvalidReserve { name: String, value: Decimal },

    #[error("invalid swap amount: {0}")]
    InvalidAmount(Decimal),

    #[error("fee rate must be in [0, 1), got {0}")]
    InvalidFee(Decimal),

    #[error("requested {requested} out of a pool holding {available}")]
    InsufficientLiquidity { requested: Decimal, available: Decimal },

    #[error("numeric overflow in {0}")]
    NumericOverflow(&'static str),

    #[error("closed-form solve rejected: {0}")]
    NumericInstability(String),
}

impl ArbError {
    pub fn invalid_reserve(name: impl Into<String>, value: Decimal) -> Self {
        ArbError::InvalidReserve { name: name.into(), value }
    }
}
