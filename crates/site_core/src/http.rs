use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::{
    domain::StepId,
    error::RemoteError,
    protocol::{RunResponse, SANDBOX_CONTENT_TYPE, SANDBOX_RUN_PATH, TUTORIAL_STEPS_PATH},
};
use tracing::debug;
use url::Url;

use crate::source::{ExecutionSource, FragmentSource};

/// HTTP client for the site's fragment and sandbox endpoints.
#[derive(Debug, Clone)]
pub struct SiteClient {
    http: Client,
    site_url: Url,
}

impl SiteClient {
    pub fn new(site_url: &str, timeout: Duration) -> Result<Self> {
        let site_url =
            Url::parse(site_url).with_context(|| format!("invalid site url '{site_url}'"))?;
        if site_url.cannot_be_a_base() {
            bail!("site url '{site_url}' cannot carry endpoint paths");
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build site http client")?;
        Ok(Self { http, site_url })
    }

    pub fn site_url(&self) -> &Url {
        &self.site_url
    }

    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, RemoteError> {
        let mut url = self.site_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                RemoteError::transport(format!("site url '{}' cannot be a base", self.site_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::transport(err.to_string())
}

#[async_trait]
impl FragmentSource for SiteClient {
    async fn fetch_step(&self, step: &StepId) -> Result<String, RemoteError> {
        let [tutorial, steps] = TUTORIAL_STEPS_PATH;
        let url = self.endpoint([tutorial, steps, step.as_str()])?;
        debug!("http: GET {url}");
        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(RemoteError::rejected(status.as_u16(), body));
        }
        Ok(body)
    }
}

#[async_trait]
impl ExecutionSource for SiteClient {
    async fn run(&self, source: &str) -> Result<RunResponse, RemoteError> {
        let url = self.endpoint(SANDBOX_RUN_PATH)?;
        debug!("http: POST {url} bytes={}", source.len());
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, SANDBOX_CONTENT_TYPE)
            .body(source.to_string())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        Ok(RunResponse::new(status, body))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
