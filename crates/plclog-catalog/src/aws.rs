//! SigV4-signing HTTP client for AWS JSON APIs

use crate::http::{build_reqwest_client, send_post, HttpClient, HttpResponse};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use std::time::SystemTime;

pub struct AwsSigV4HttpClient {
    client: reqwest::Client,
    credentials_provider: SharedCredentialsProvider,
    region: String,
    service: &'static str,
}

impl AwsSigV4HttpClient {
    /// Credentials come from the default chain (Lambda role, env vars, profile)
    pub async fn new(region: &str, service: &'static str) -> Result<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let credentials_provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| anyhow!("No AWS credentials provider available"))?;

        Ok(Self {
            client: build_reqwest_client()?,
            credentials_provider,
            region: region.to_string(),
            service,
        })
    }
}

#[async_trait]
impl HttpClient for AwsSigV4HttpClient {
    async fn post(
        &self,
        url: &str,
        mut headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Result<HttpResponse> {
        let credentials = self
            .credentials_provider
            .provide_credentials()
            .await
            .context("Failed to resolve AWS credentials")?;
        let identity = credentials.into();

        let url = url.parse::<url::Url>().context("Failed to parse URL")?;
        let signable_request = SignableRequest::new(
            "POST",
            url.as_str(),
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            SignableBody::Bytes(&body),
        )
        .map_err(|e| anyhow!("Failed to build signable request: {}", e))?;

        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(self.service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| anyhow!("Failed to build signing params: {}", e))?
            .into();

        let (instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|e| anyhow!("Failed to sign request: {}", e))?
            .into_parts();

        for (name, value) in instructions.headers() {
            headers.push((name.to_string(), value.to_string()));
        }

        send_post(&self.client, url.as_str(), &headers, body).await
    }
}
