//! src/services/signed_client.rs
//!
//! SignedClient — the shared signed-request issuer. Builds an HTTP request,
//! signs it with SigV4 for a given service name using the ambient AWS
//! credentials, and performs the call. Non-2xx responses surface as a typed
//! error carrying the response body; the caller decides whether that is
//! fatal.

use aws_credential_types::provider::{
    error::CredentialsError, ProvideCredentials, SharedCredentialsProvider,
};
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningError, SigningSettings,
};
use aws_sigv4::sign::v4;
use http::{header, HeaderValue, Method, Request};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SignedClientError {
    #[error("could not resolve AWS credentials: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("could not sign request: {0}")]
    Sign(#[from] SigningError),
    #[error("invalid signing parameters: {0}")]
    SigningParams(#[from] v4::signing_params::BuildError),
    #[error("could not build request: {0}")]
    Request(#[from] http::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("service `{service}` returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },
}

pub type SignedClientResult<T> = Result<T, SignedClientError>;

/// Issues SigV4-signed HTTP requests. Credentials come from the provider
/// handed in at construction (the ambient chain in production, static
/// credentials in tests) and are resolved per request, so rotation is
/// picked up without restarting.
#[derive(Clone)]
pub struct SignedClient {
    http: reqwest::Client,
    region: String,
    credentials: SharedCredentialsProvider,
}

impl SignedClient {
    pub fn new(region: impl Into<String>, credentials: SharedCredentialsProvider) -> Self {
        Self {
            http: reqwest::Client::new(),
            region: region.into(),
            credentials,
        }
    }

    /// Sign and send one request against `service`, returning the response
    /// body. JSON bodies get a `content-type` header, included in the
    /// signature. A non-2xx status logs the error body and returns
    /// `SignedClientError::Status`.
    pub async fn request(
        &self,
        service: &str,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> SignedClientResult<String> {
        let credentials = self.credentials.provide_credentials().await?;
        let identity = credentials.into();
        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()?
            .into();

        let payload = body.unwrap_or_default();
        let signed_headers: &[(&str, &str)] = if payload.is_empty() {
            &[]
        } else {
            &[("content-type", "application/json")]
        };
        let signable = SignableRequest::new(
            method.as_str(),
            url,
            signed_headers.iter().copied(),
            SignableBody::Bytes(&payload),
        )?;
        let (instructions, _signature) = sign(signable, &signing_params)?.into_parts();

        let mut request = Request::builder()
            .method(method.clone())
            .uri(url)
            .body(payload)?;
        if !request.body().is_empty() {
            request.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        instructions.apply_to_request_http1x(&mut request);

        debug!("issuing signed {} {} ({})", method, url, service);
        let response = self.http.execute(reqwest::Request::try_from(request)?).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!("signed {} {} failed with {}: {}", method, url, status, text);
            return Err(SignedClientError::Status {
                service: service.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}
