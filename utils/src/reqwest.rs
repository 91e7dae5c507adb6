use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use url::Url;

use crate::serde::{SerdePathError, SerdeResponseParseAsync};

#[derive(Debug)]
pub enum ReqwestStage {
    Send,
    Status,
    DecodeText,
    Deserialise,
}

pub(crate) fn parse_url<U: ToString>(url: U) -> crate::Result<Url> {
    url.to_string()
        .parse::<Url>()
        .map_err(|_| crate::Error::InvalidUrl(url.to_string()))
}

#[derive(Debug)]
pub struct ReqwestErrorContext {
    pub url: Url,
}

#[derive(Debug)]
pub enum ReqwestInnerError {
    Reqwest(reqwest::Error),
    SerdePath(SerdePathError),
}

impl ReqwestInnerError {
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_connect(),
            Self::SerdePath(_) => false,
        }
    }
}

/// GET request builder that remembers the URL so that every failure can be
/// reported together with the stage it happened at.
pub struct Reqwest {
    builder: RequestBuilder,
    error_context: Option<ReqwestErrorContext>,
}

impl Reqwest {
    /// Builds a GET on `client`, so the connection pool is reused between calls.
    pub fn get_with<U: ToString>(client: &reqwest::Client, url: U) -> crate::Result<Self> {
        let url = parse_url(url)?;
        let builder = client.get(url.clone());
        Ok(Self {
            builder,
            error_context: Some(ReqwestErrorContext { url }),
        })
    }

    async fn receive_text_internal(mut self) -> crate::Result<(String, Box<ReqwestErrorContext>)> {
        let error_context = Box::new(
            self.error_context
                .take()
                .ok_or(crate::Error::ReqwestErrorContextMissing)?,
        );

        let response = match self.builder.send().await {
            Ok(response) => response,
            Err(err) if err.is_connect() => {
                return Err(crate::Error::Internet(error_context.url));
            }
            Err(err) => {
                return Err(crate::Error::ReqwestFailed {
                    stage: ReqwestStage::Send,
                    context: error_context,
                    inner: ReqwestInnerError::Reqwest(err),
                });
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(err) => {
                return Err(crate::Error::ReqwestFailed {
                    stage: ReqwestStage::Status,
                    context: error_context,
                    inner: ReqwestInnerError::Reqwest(err),
                });
            }
        };

        match response.text().await {
            Ok(text) => Ok((text, error_context)),
            Err(err) => Err(crate::Error::ReqwestFailed {
                stage: ReqwestStage::DecodeText,
                context: error_context,
                inner: ReqwestInnerError::Reqwest(err),
            }),
        }
    }

    pub async fn receive_json<J: Debug + DeserializeOwned>(self) -> crate::Result<J> {
        let (text, error_context) = self.receive_text_internal().await?;

        text.as_str()
            .serde_parse_custom()
            .await
            .map_err(|err| crate::Error::ReqwestFailed {
                stage: ReqwestStage::Deserialise,
                context: error_context,
                inner: ReqwestInnerError::SerdePath(err),
            })
    }
}
