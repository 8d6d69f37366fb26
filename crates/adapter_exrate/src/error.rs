//! Feed adapter error types.
//!
//! Every failure in the fetch → parse → query pipeline is one of four kinds.
//! The service layer decides how much of the distinction reaches the caller.

use thiserror::Error;

/// Errors raised while fetching, parsing, or querying the rate feed.
///
/// # Examples
///
/// ```
/// use adapter_exrate::ExrateError;
///
/// let err = ExrateError::currency_not_found("xyz");
/// assert_eq!(err.kind(), "currency_not_found");
/// assert!(err.to_string().contains("xyz"));
/// ```
#[derive(Error, Debug)]
pub enum ExrateError {
    /// Upstream could not be reached, or its body could not be read.
    #[error("Upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream body is not the expected `ExrateList` document.
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    /// Requested currency code is absent from the feed.
    #[error("{currency} rate not found")]
    CurrencyNotFound {
        /// Code as requested by the caller
        currency: String,
    },

    /// Requested amount is not numeric.
    #[error("Invalid amount: {amount:?}")]
    InvalidAmount {
        /// Raw amount text as requested by the caller
        amount: String,
    },
}

impl ExrateError {
    /// Create a malformed feed error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedFeed(message.into())
    }

    /// Create a currency not found error.
    pub fn currency_not_found(currency: impl Into<String>) -> Self {
        Self::CurrencyNotFound {
            currency: currency.into(),
        }
    }

    /// Create an invalid amount error.
    pub fn invalid_amount(amount: impl Into<String>) -> Self {
        Self::InvalidAmount {
            amount: amount.into(),
        }
    }

    /// Stable machine-readable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::MalformedFeed(_) => "malformed_feed",
            Self::CurrencyNotFound { .. } => "currency_not_found",
            Self::InvalidAmount { .. } => "invalid_amount",
        }
    }

    /// Whether the failure originates upstream rather than in the request.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network(_) | Self::MalformedFeed(_))
    }
}

impl From<quick_xml::Error> for ExrateError {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedFeed(format!("XML syntax error: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for ExrateError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::MalformedFeed(format!("XML attribute error: {}", err))
    }
}
