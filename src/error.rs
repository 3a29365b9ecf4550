//! Error kinds surfaced by a conversion.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Holiday list missing or corrupt
    #[error("failed to load holiday calendar: {0}")]
    DataLoad(String),

    /// Network failure, timeout, or a non-200 response from the bulletin endpoint
    #[error("failed to fetch Ptax bulletin: {0}")]
    Fetch(String),

    /// Bulletin HTML did not have the expected shape
    #[error("failed to parse Ptax bulletin: {0}")]
    Parse(String),

    #[error("no business day on or before {0}")]
    NoBusinessDay(jiff::civil::Date),

    #[error("invalid USD amount: {0}")]
    InvalidAmount(Decimal),

    #[error("percentage must not be negative, got {0}")]
    InvalidPercent(Decimal),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}
