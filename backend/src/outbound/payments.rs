//! Reqwest-backed payment provider adapter.
//!
//! Owns transport details only: request serialisation, timeout and HTTP
//! error mapping, and JSON decoding of the intent response. The provider is
//! reached once per checkout to open an intent; everything after the
//! client-side confirmation is local ledger bookkeeping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{PaymentIntent, PaymentProvider, PaymentProviderError};

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Intent creation payload sent to the provider.
#[derive(Debug, Serialize)]
struct IntentRequestDto<'a> {
    amount: Decimal,
    currency: &'a str,
}

/// Intent creation response returned by the provider.
#[derive(Debug, Deserialize)]
struct IntentResponseDto {
    client_secret: String,
}

/// Provider adapter performing HTTP POST requests against one endpoint.
pub struct HttpPaymentProvider {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl HttpPaymentProvider {
    /// Build an adapter with the default thirty-second request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(
            endpoint,
            api_key,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        endpoint: Url,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: Zeroizing::new(api_key),
        })
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&IntentRequestDto { amount, currency })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: IntentResponseDto = serde_json::from_slice(body.as_ref()).map_err(|err| {
            PaymentProviderError::decode(format!("invalid intent payload: {err}"))
        })?;
        Ok(PaymentIntent {
            client_secret: decoded.client_secret,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentProviderError {
    PaymentProviderError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentProviderError {
    let detail = String::from_utf8_lossy(body);
    PaymentProviderError::rejected(format!("status {status}: {detail}"))
}
