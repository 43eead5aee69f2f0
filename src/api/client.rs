use anyhow::{Context as _, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, Url,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

pub struct KeysBankClient {
    http: Client,
    base_url: Url,
}

impl KeysBankClient {
    pub fn new(base_url: Url) -> Result<KeysBankClient> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(KeysBankClient { http, base_url })
    }

    pub(super) fn http(&self) -> &Client {
        &self.http
    }

    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        endpoint(&self.base_url, segments)
    }

    /// Sends the request and decodes a successful JSON response.
    pub(super) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            let err = ApiError::from_response(status.as_u16(), body);
            log::warn!("{err}");
            return Err(err);
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::decode(status.as_u16(), err))
    }
}

/// Appends percent-encoded path segments to `base`, keeping any path prefix
/// the base URL already has.
pub(super) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(super) fn with_query(mut url: Url, params: &[(&str, String)]) -> Url {
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
    }
    url
}
