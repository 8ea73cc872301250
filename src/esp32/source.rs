use std::time::Duration;

use chrono::{DateTime, Utc};
use embedded_svc::http::client::Client;
use embedded_svc::io::Read;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::io::EspIOError;
use esp_idf_svc::sys::EspError;
use log::info;

use crate::ForecastSource;
use crate::config::ApiConfig;
use crate::forecast::{ForecastRecord, ForecastResponse, forecast_url};

const TIMEOUT: Duration = Duration::from_secs(15);
const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// Error types for fetching the forecast over HTTPS.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP connection failed: {0}")]
    Connection(#[from] EspError),
    #[error("bad request (400) for {url}")]
    BadRequest { url: String },
    #[error("HTTP error: status {0}")]
    Status(u16),
    #[error("response too large (over 64 KiB)")]
    TooLarge,
    #[error("HTTP transfer failed: {0}")]
    Io(#[from] EspIOError),
    #[error("failed to decode forecast: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Carbon intensity API client using the ESP-IDF HTTPS stack.
#[derive(Debug, Clone)]
pub struct Esp32ForecastClient {
    api: ApiConfig,
}

impl Esp32ForecastClient {
    pub fn new(api: ApiConfig) -> Self {
        Self { api }
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(TIMEOUT),
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })?;
        let mut client = Client::wrap(connection);
        let mut response = client.get(url)?.submit()?;

        let status = response.status();
        info!("HTTP GET {url} -> status {status}");
        match status {
            200 => {}
            400 => {
                return Err(FetchError::BadRequest {
                    url: url.to_string(),
                });
            }
            other => return Err(FetchError::Status(other)),
        }

        let mut body = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = response.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            if body.len() + n > MAX_RESPONSE_SIZE {
                return Err(FetchError::TooLarge);
            }
            body.extend_from_slice(&chunk[..n]);
        }
        Ok(body)
    }
}

impl ForecastSource for Esp32ForecastClient {
    type Error = FetchError;

    fn fetch(&mut self, now: DateTime<Utc>) -> Result<Vec<ForecastRecord>, Self::Error> {
        let url = forecast_url(&self.api, now);
        let body = self.get(&url)?;
        let response: ForecastResponse = serde_json::from_slice(&body)?;
        Ok(response.into_records())
    }
}
