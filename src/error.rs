//! Crate-level errors for everything that is not a request failure.
//!
//! Request failures are [`AreqError`](crate::AreqError)s; this type covers
//! configuration loading and misuse of the exception constructors.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Construction error: {message}")]
    Construction { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction {
            message: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
