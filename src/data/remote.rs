//! Remote dataset download.
//!
//! The dashboard's reference dataset lives at a fixed public URL; we fetch it
//! once at startup and hand the body to the CSV ingest. The URL can be
//! overridden with `AUTO_SALES_CSV_URL` (loaded from the environment or a
//! `.env` file).

use reqwest::blocking::Client;

use crate::error::AppError;
use crate::io::ingest::{ingest_sales_csv, IngestedData};

const DEFAULT_CSV_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/d51iMGfp_t0QpO30Lym-dw/automobile-sales.csv";

pub struct DatasetClient {
    client: Client,
    url: String,
}

impl DatasetClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let url = std::env::var("AUTO_SALES_CSV_URL")
            .unwrap_or_else(|_| DEFAULT_CSV_URL.to_string());
        Ok(Self {
            client: Client::new(),
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download and ingest the dataset.
    ///
    /// A missing or malformed dataset at load time is an unrecoverable
    /// startup failure: reported once, never retried.
    pub fn fetch_dataset(&self) -> Result<IngestedData, AppError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("Failed to download dataset: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::new(
                4,
                format!("Dataset download failed with HTTP {status} ({}).", self.url),
            ));
        }

        let body = response
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read dataset body: {e}")))?;

        ingest_sales_csv(body.as_bytes())
    }
}
