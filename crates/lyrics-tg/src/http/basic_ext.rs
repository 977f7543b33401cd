use super::{HttpClientError, MAX_ERROR_BODY_CHARS};
use crate::prelude::*;
use crate::{err, err_ctx, Result};
use async_trait::async_trait;
use easy_ext::ext;
use reqwest::{Response, StatusCode};
use reqwest_middleware::RequestBuilder;

#[ext(RequestBuilderBasicExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    /// Better version of [`RequestBuilder::send`] that returns an error
    /// if the error response status code is returned.
    async fn try_send(self) -> Result<Response> {
        let response = self
            .send()
            .await
            .map_err(err_ctx!(HttpClientError::Request))?;

        ensure_success(response).await
    }

    /// Same as [`RequestBuilderBasicExt::try_send`], but `404 Not Found`
    /// is not considered an error and results in [`None`] instead.
    async fn try_send_or_not_found(self) -> Result<Option<Response>> {
        let response = self
            .send()
            .await
            .map_err(err_ctx!(HttpClientError::Request))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        ensure_success(response).await.map(Some)
    }

    async fn read_text(self) -> Result<String> {
        self.try_send()
            .await?
            .text()
            .await
            .map_err(err_ctx!(HttpClientError::ReadPayload))
    }

    /// Same as [`RequestBuilderBasicExt::read_text`], but `404 Not Found`
    /// results in [`None`].
    async fn read_text_or_not_found(self) -> Result<Option<String>> {
        let Some(response) = self.try_send_or_not_found().await? else {
            return Ok(None);
        };
        response
            .text()
            .await
            .map(Some)
            .map_err(err_ctx!(HttpClientError::ReadPayload))
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body
            .truncate_chars_with_marker(MAX_ERROR_BODY_CHARS, "...")
            .into_owned(),
        Err(err) => format!(
            "Could not collect the error response body text: {}",
            err.display_chain()
        ),
    };

    Err(err!(HttpClientError::BadResponseStatusCode { status, body }))
}
