//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpRequest, HttpResponse};
use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

/// HTTP client trait for issuing one request against the target API
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// reqwest-backed client bound to the target base URL
///
/// The underlying connection pool is built once and shared by every virtual
/// user; cloning is cheap.
#[derive(Debug, Clone)]
pub struct HttpManager {
    client: Client,
    base_url: Url,
    config: HttpConfig,
}

impl HttpManager {
    /// Create a manager for `base_url` with default configuration
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Self::with_config(base_url, HttpConfig::default())
    }

    /// Create a manager for `base_url` with specific configuration
    pub fn with_config(base_url: &str, config: HttpConfig) -> Result<Self, HttpError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(base_url.to_string()));
        }

        debug!(
            "Creating HttpManager for {} with timeout: {}s",
            base_url,
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .build()
            .map_err(|e| HttpError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Resolve a request path against the base URL, keeping any base path prefix
    pub fn url_for(&self, path: &str) -> Result<Url, HttpError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", path, e)))
    }
}

#[async_trait::async_trait]
impl HttpClient for HttpManager {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.url_for(&request.path)?;
        trace!("Sending {} to {}", request, url);

        let mut builder = self
            .client
            .request(reqwest::Method::from(request.method), url);
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        trace!("{} answered {} ({} bytes)", request, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_resolution() {
        let manager = HttpManager::new("http://localhost:8888").unwrap();
        assert_eq!(
            manager.url_for("/hospital").unwrap().as_str(),
            "http://localhost:8888/hospital"
        );
        assert_eq!(
            manager.url_for("/").unwrap().as_str(),
            "http://localhost:8888/"
        );

        let prefixed = HttpManager::new("http://localhost:8888/app/").unwrap();
        assert_eq!(
            prefixed.url_for("/doctor-patient").unwrap().as_str(),
            "http://localhost:8888/app/doctor-patient"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpManager::new("not a url"),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patient"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .expect(1)
            .mount(&server)
            .await;

        let manager = HttpManager::new(&server.uri()).unwrap();
        let response = manager.send(HttpRequest::get("/patient")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<table></table>");
    }

    #[tokio::test]
    async fn test_post_sends_form_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/doctor"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("surname=Smith"))
            .and(body_string_contains("profession=Surgeon"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK: ID 4 for Smith"))
            .expect(1)
            .mount(&server)
            .await;

        let manager = HttpManager::new(&server.uri()).unwrap();
        let request = HttpRequest::post_form(
            "/doctor",
            [
                ("surname", "Smith"),
                ("profession", "Surgeon"),
                ("hospital_ID", ""),
            ],
        );
        let response = manager.send(request).await.unwrap();

        assert!(response.is_ok());
        assert!(response.body.contains("OK: ID"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/diagnosis"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let manager = HttpManager::new(&server.uri()).unwrap();
        let response = manager.send(HttpRequest::get("/diagnosis")).await.unwrap();
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = HttpConfig {
            timeout: Duration::from_millis(50),
            ..HttpConfig::default()
        };
        let manager = HttpManager::with_config(&server.uri(), config).unwrap();
        let err = manager.send(HttpRequest::get("/")).await.unwrap_err();
        assert!(err.is_timeout(), "{}", err);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Port 1 is never served in the test environment
        let manager = HttpManager::new("http://127.0.0.1:1").unwrap();
        let err = manager.send(HttpRequest::get("/")).await.unwrap_err();
        assert!(matches!(err, HttpError::NetworkError(_)));
    }
}
