use super::HttpClientError;
use crate::prelude::*;
use crate::{err, Result};
use async_trait::async_trait;
use easy_ext::ext;
use reqwest::Response;
use reqwest_middleware::RequestBuilder;
use serde::de::DeserializeOwned;

#[ext(RequestBuilderJsonExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    async fn read_json<Res: DeserializeOwned>(self) -> Result<Res> {
        let body = self.read_text().await?;
        parse_json(&body)
    }

    /// Same as [`RequestBuilderJsonExt::read_json`], but `404 Not Found`
    /// results in [`None`].
    async fn read_json_or_not_found<Res: DeserializeOwned>(self) -> Result<Option<Res>> {
        let Some(response) = self.try_send_or_not_found().await? else {
            return Ok(None);
        };
        read_response_json(response).await.map(Some)
    }
}

async fn read_response_json<Res: DeserializeOwned>(response: Response) -> Result<Res> {
    let body = response
        .text()
        .await
        .map_err(|source| err!(HttpClientError::ReadPayload { source }))?;

    parse_json(&body)
}

fn parse_json<Res: DeserializeOwned>(body: &str) -> Result<Res> {
    serde_json::from_str(body).map_err(|err| {
        warn!(response_body = %body, "Bad JSON response");
        err!(HttpClientError::UnexpectedResponseJsonShape { source: err })
    })
}
