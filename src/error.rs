use crate::config::ConfigError;
use crate::document::HtmlError;
use crate::editing::TransactionError;
use crate::pagination::MarkerError;
use thiserror::Error;

/// Any error surfaced by the editor facade
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load document: {0}")]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Marker(#[from] MarkerError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
