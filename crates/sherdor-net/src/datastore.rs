//! Exact-count client for the hosted data store's REST interface.
//!
//! Counts are requested with `HEAD /rest/v1/<collection>?select=*` and
//! `Prefer: count=exact`; the store answers with no rows and the total in
//! the `Content-Range` header (`0-4/5`, or `*/0` for an empty table).

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::Client;
use sherdor_core::config::DataStoreConfig;
use sherdor_core::error::{SherdorError, SherdorResult};
use sherdor_core::platform::CountSource;
use sherdor_core::types::Collection;
use tracing::{debug, trace};
use url::Url;

/// Client for count queries against the data store.
#[derive(Debug, Clone)]
pub struct DataStoreClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl DataStoreClient {
    pub fn new(config: &DataStoreConfig) -> SherdorResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SherdorError::data_store(e.to_string()))?;

        // Relative joins replace the last segment unless the path ends in '/'.
        let mut base_url = config.base_url()?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn collection_url(&self, collection: Collection) -> SherdorResult<Url> {
        Ok(self
            .base_url
            .join(&format!("rest/v1/{}", collection.as_str()))?)
    }
}

/// Extract the total from a `Content-Range` value.
///
/// Returns `None` when the store did not report a total (`0-4/*`).
pub fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl CountSource for DataStoreClient {
    async fn count(&self, collection: Collection) -> SherdorResult<u64> {
        let url = self.collection_url(collection)?;
        trace!(%collection, url = %url, "Counting rows");

        let response = self
            .client
            .head(url)
            .query(&[("select", "*")])
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| SherdorError::data_store(format!("{collection}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SherdorError::data_store(format!(
                "{collection}: status {status}"
            )));
        }

        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        match count {
            Some(count) => {
                debug!(%collection, count, "Counted rows");
                Ok(count)
            }
            None => {
                debug!(%collection, "No count reported, assuming 0");
                Ok(0)
            }
        }
    }
}
