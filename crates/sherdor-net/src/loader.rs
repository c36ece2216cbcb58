//! reqwest-backed network capability for the service worker.

use std::time::Duration;

use async_trait::async_trait;
use hashbrown::HashMap;
use reqwest::Client;
use sherdor_core::error::{SherdorError, SherdorResult};
use sherdor_core::platform::Network;
use sherdor_core::types::{Request, Response};
use tracing::{debug, trace};

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// User agent string.
    pub user_agent: String,
    /// Default timeout.
    pub default_timeout: Duration,
    /// Maximum redirects.
    pub max_redirects: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("Sherdor/{}", env!("CARGO_PKG_VERSION")),
            default_timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// Performs requests over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new(config: LoaderConfig) -> SherdorResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.default_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| SherdorError::network(e.to_string()))?;

        debug!("HttpNetwork initialized");
        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> SherdorResult<Response> {
        debug!(url = %request.url, method = %request.method, "Fetching resource");

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SherdorError::network(format!("{}: {}", request.url, e)))?;

        let status = response.status();
        let url = response.url().clone();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| SherdorError::network(format!("{}: {}", url, e)))?;

        trace!(url = %url, status = %status, body_len = body.len(), "Response received");

        Ok(Response {
            url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();
        assert!(config.user_agent.starts_with("Sherdor/"));
        assert_eq!(config.max_redirects, 10);
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manifest.json"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"name":"Sherdor Mebel"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let network = HttpNetwork::new(LoaderConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/manifest.json", server.uri())).unwrap();
        let request = Request::get(url).header("accept", "application/json");

        let response = network.fetch(&request).await.unwrap();
        assert!(response.ok());
        assert_eq!(response.status_text, "OK");
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(response.body.as_ref(), br#"{"name":"Sherdor Mebel"}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/icon-512.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let network = HttpNetwork::new(LoaderConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/icon-512.jpg", server.uri())).unwrap();

        let response = network.fetch(&Request::get(url)).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.ok());
    }

    struct NoNotifications;

    #[async_trait]
    impl sherdor_core::platform::NotificationSink for NoNotifications {
        async fn show_notification(
            &self,
            _notification: sherdor_core::types::Notification,
        ) -> SherdorResult<()> {
            Ok(())
        }
    }

    struct NoWindows;

    #[async_trait]
    impl sherdor_core::platform::WindowClients for NoWindows {
        async fn open_window(&self, _url: &Url) -> SherdorResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_service_worker_over_http() {
        use sherdor_core::config::PwaConfig;
        use sherdor_sw::{CacheStorage, FetchEvent, ServiceWorker, WorkerCapabilities};
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let server = MockServer::start().await;
        for asset in ["/", "/manifest.json", "/icon-192.jpg", "/icon-512.jpg"] {
            Mock::given(method("GET"))
                .and(path(asset))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!("asset {asset}")))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/api/mebel"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let config = PwaConfig {
            origin: server.uri(),
            ..PwaConfig::default()
        };
        let origin = config.origin_url().unwrap();
        let capabilities = WorkerCapabilities {
            network: Arc::new(HttpNetwork::new(LoaderConfig::default()).unwrap()),
            notifications: Arc::new(NoNotifications),
            clients: Arc::new(NoWindows),
        };
        let caches = Arc::new(RwLock::new(CacheStorage::new()));
        let (mut worker, _events) = ServiceWorker::new(config, caches, capabilities);

        worker.on_install().await.unwrap();

        // Served from the precache; the mock expects a single GET.
        let cached = worker
            .on_fetch(&FetchEvent::new(Request::get(origin.join("/manifest.json").unwrap())))
            .await;
        assert!(cached.from_cache);
        assert_eq!(cached.body.as_ref(), b"asset /manifest.json");

        let live = worker
            .on_fetch(&FetchEvent::new(Request::get(origin.join("/api/mebel").unwrap())))
            .await;
        assert!(!live.from_cache);
        assert_eq!(live.body.as_ref(), b"[]");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let network = HttpNetwork::new(LoaderConfig {
            default_timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();
        let url = Url::parse("http://127.0.0.1:9/").unwrap();

        assert!(matches!(
            network.fetch(&Request::get(url)).await,
            Err(SherdorError::Network(_))
        ));
    }
}
