use std::path::PathBuf;

use url::Url;

use crate::reqwest::{ReqwestErrorContext, ReqwestInnerError, ReqwestStage};

pub type Result<T> = std::result::Result<T, UtilsError>;

#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error("Pair '{0}' is not valid, expected the form AMOUNT_ASSET/PRICE_ASSET.")]
    InvalidPair(String),

    #[error("Failed to get base directories.")]
    BaseDirsFailed,

    #[error("Failed to create directory: {0:?}. (Error: {1:?})")]
    CreateDirAllFailed(PathBuf, std::io::Error),

    #[error("Failed to read the file: {0}. (Error: {1:?})")]
    FileReadFailed(PathBuf, std::io::Error),

    #[error("Failed to write to the file: {0}. (Error: {1:?})")]
    FileWriteFailed(PathBuf, std::io::Error),

    #[error("Parsing the toml file failed: {0}. (Error: {1:?})")]
    TomlParsingFailed(PathBuf, toml::de::Error),

    #[error("Formatting to toml format failed: {0}. (Error: {1:?})")]
    TomlFormattingFailed(String, toml::ser::Error),

    #[error("Please check your internet connection, the URL seems to be unreachable: {0}")]
    Internet(Url),

    #[error("Request '{url}' failed at stage '{stage:?}' (Error='{inner:?}', Context='{context:?}')", url = context.url)]
    ReqwestFailed {
        stage: ReqwestStage,
        context: Box<ReqwestErrorContext>,
        inner: ReqwestInnerError,
    },

    #[error("Reqwest builder missing error context, this is a bug please report it.")]
    ReqwestErrorContextMissing,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl UtilsError {
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Internet(_) => true,
            Self::ReqwestFailed { inner, .. } => inner.is_connect(),
            _ => false,
        }
    }
}
