//! 短链接服务
//!
//! 按优先级依次尝试多个免费短链接服务，全部失败时返回原链接。

use crate::config::ShortenerConfig;
use crate::{DataCardError, DataCardResult, debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// 请求方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortenMethod {
    /// `GET {endpoint}?url=...`
    GetQuery,
    /// `POST {endpoint}`，表单 `format=simple&url=...`
    PostSimpleForm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenerService {
    pub name: String,
    pub method: ShortenMethod,
    pub endpoint: String,
}

impl ShortenerService {
    pub fn new(name: impl Into<String>, method: ShortenMethod, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            endpoint: endpoint.into(),
        }
    }
}

/// 默认服务列表：tinyurl -> is.gd -> v.gd
pub fn default_services() -> Vec<ShortenerService> {
    vec![
        ShortenerService::new(
            "tinyurl",
            ShortenMethod::GetQuery,
            "http://tinyurl.com/api-create.php",
        ),
        ShortenerService::new(
            "is.gd",
            ShortenMethod::PostSimpleForm,
            "https://is.gd/create.php",
        ),
        ShortenerService::new(
            "v.gd",
            ShortenMethod::PostSimpleForm,
            "https://v.gd/create.php",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct UrlShortener {
    client: reqwest::Client,
    services: Vec<ShortenerService>,
    min_length: usize,
    timeout: Duration,
}

impl Default for UrlShortener {
    fn default() -> Self {
        Self::new(&ShortenerConfig::default())
    }
}

impl UrlShortener {
    pub fn new(config: &ShortenerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            services: config.services.clone(),
            min_length: config.min_length,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn services(&self) -> &[ShortenerService] {
        &self.services
    }

    /// 缩短链接，失败时返回原链接
    pub async fn shorten(&self, long_url: &str) -> String {
        if long_url.trim().is_empty() || long_url.chars().count() < self.min_length {
            return long_url.to_string();
        }

        for service in &self.services {
            match self.try_service(service, long_url).await {
                Ok(Some(short)) if !short.is_empty() && short != long_url => {
                    debug!(target: "Shortener", "{} -> {}", service.name, short);
                    return short;
                }
                Ok(_) => {}
                Err(e) => warn!(target: "Shortener", "短链接服务 {} 失败: {}", service.name, e),
            }
        }

        long_url.to_string()
    }

    /// 批量缩短，逐个顺序执行，键保持不变
    pub async fn shorten_all(&self, urls: &HashMap<String, String>) -> HashMap<String, String> {
        let mut result = HashMap::with_capacity(urls.len());
        for (key, url) in urls {
            result.insert(key.clone(), self.shorten(url).await);
        }
        result
    }

    // 非 2xx 视为无结果
    async fn try_service(
        &self,
        service: &ShortenerService,
        long_url: &str,
    ) -> DataCardResult<Option<String>> {
        let req = match service.method {
            ShortenMethod::GetQuery => self
                .client
                .get(&service.endpoint)
                .query(&[("url", long_url)]),
            ShortenMethod::PostSimpleForm => self
                .client
                .post(&service.endpoint)
                .form(&[("format", "simple"), ("url", long_url)]),
        };

        let resp = req
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| provider_error(service, e))?;
        if !resp.status().is_success() {
            debug!(target: "Shortener", "{} 返回 {}", service.name, resp.status());
            return Ok(None);
        }

        let text = resp.text().await.map_err(|e| provider_error(service, e))?;
        Ok(Some(text.trim().to_string()))
    }
}

fn provider_error(service: &ShortenerService, e: reqwest::Error) -> DataCardError {
    DataCardError::Provider {
        service: service.name.clone(),
        reason: e.to_string(),
    }
}

static SHORTENER: OnceLock<UrlShortener> = OnceLock::new();

fn global_shortener() -> &'static UrlShortener {
    SHORTENER.get_or_init(UrlShortener::default)
}

/// 使用默认服务列表缩短单个链接
pub async fn shorten_url(long_url: &str) -> String {
    global_shortener().shorten(long_url).await
}

/// 使用默认服务列表批量缩短
pub async fn shorten_urls(urls: &HashMap<String, String>) -> HashMap<String, String> {
    global_shortener().shorten_all(urls).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const LONG_URL: &str =
        "https://example.com/some/really/long/path/that/needs/shortening?with=query&and=more";

    fn shortener_with(services: Vec<ShortenerService>) -> UrlShortener {
        UrlShortener::new(&ShortenerConfig {
            min_length: 50,
            timeout_secs: 5,
            services,
        })
    }

    fn local_services(server: &MockServer) -> Vec<ShortenerService> {
        vec![
            ShortenerService::new("first", ShortenMethod::GetQuery, server.url("/tiny")),
            ShortenerService::new("second", ShortenMethod::PostSimpleForm, server.url("/isgd")),
            ShortenerService::new("third", ShortenMethod::PostSimpleForm, server.url("/vgd")),
        ]
    }

    #[tokio::test]
    async fn short_input_skips_network() {
        let server = MockServer::start_async().await;
        let mocks: Vec<_> = ["/tiny", "/isgd", "/vgd"]
            .into_iter()
            .map(|path| {
                server.mock(|when, then| {
                    when.path(path);
                    then.status(200).body("https://s/x");
                })
            })
            .collect();

        let shortener = shortener_with(local_services(&server));
        assert_eq!(shortener.shorten("https://a.b/c").await, "https://a.b/c");
        assert_eq!(shortener.shorten("   ").await, "   ");
        assert_eq!(shortener.shorten("").await, "");
        for mock in &mocks {
            mock.assert_calls(0);
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let server = MockServer::start_async().await;
        let tiny = server.mock(|when, then| {
            when.method(GET).path("/tiny").query_param("url", LONG_URL);
            then.status(200).body("  https://tinyurl.com/abc\n");
        });
        let isgd = server.mock(|when, then| {
            when.method(POST).path("/isgd");
            then.status(200).body("https://is.gd/xyz");
        });

        let shortener = shortener_with(local_services(&server));
        assert_eq!(shortener.shorten(LONG_URL).await, "https://tinyurl.com/abc");
        tiny.assert_calls(1);
        isgd.assert_calls(0);
    }

    #[tokio::test]
    async fn falls_through_failing_and_unchanged_providers() {
        let server = MockServer::start_async().await;
        let tiny = server.mock(|when, then| {
            when.method(GET).path("/tiny");
            then.status(503).body("unavailable");
        });
        let isgd = server.mock(|when, then| {
            when.method(POST)
                .path("/isgd")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("format=simple");
            then.status(200).body(LONG_URL);
        });
        let vgd = server.mock(|when, then| {
            when.method(POST).path("/vgd").body_includes("format=simple");
            then.status(200).body("https://v.gd/ok");
        });

        let shortener = shortener_with(local_services(&server));
        assert_eq!(shortener.shorten(LONG_URL).await, "https://v.gd/ok");
        tiny.assert_calls(1);
        isgd.assert_calls(1);
        vgd.assert_calls(1);
    }

    #[tokio::test]
    async fn total_failure_returns_original() {
        let server = MockServer::start_async().await;
        for path in ["/tiny", "/isgd", "/vgd"] {
            server.mock(|when, then| {
                when.path(path);
                then.status(500);
            });
        }

        let mut services = local_services(&server);
        // 不可达的服务同样被吞掉
        services.insert(
            0,
            ShortenerService::new("dead", ShortenMethod::GetQuery, "http://127.0.0.1:1/none"),
        );
        let shortener = shortener_with(services);
        assert_eq!(shortener.shorten(LONG_URL).await, LONG_URL);
    }

    #[tokio::test]
    async fn empty_body_is_not_accepted() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/tiny");
            then.status(200).body("   ");
        });
        server.mock(|when, then| {
            when.method(POST).path("/isgd");
            then.status(200).body("https://is.gd/1");
        });

        let shortener = shortener_with(local_services(&server));
        assert_eq!(shortener.shorten(LONG_URL).await, "https://is.gd/1");
    }

    #[tokio::test]
    async fn shorten_all_preserves_keys() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/tiny");
            then.status(200).body("https://tinyurl.com/k");
        });

        let shortener = shortener_with(local_services(&server));
        let urls = HashMap::from([
            ("audio".to_string(), LONG_URL.to_string()),
            ("jump".to_string(), "https://short.io".to_string()),
        ]);
        let result = shortener.shorten_all(&urls).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result["audio"], "https://tinyurl.com/k");
        assert_eq!(result["jump"], "https://short.io");
    }

    #[test]
    fn default_chain_order() {
        let names: Vec<_> = UrlShortener::default()
            .services()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["tinyurl", "is.gd", "v.gd"]);
    }

    #[tokio::test]
    async fn global_helper_short_circuits() {
        assert_eq!(shorten_url("https://a.b").await, "https://a.b");
        let urls = HashMap::from([("k".to_string(), String::new())]);
        assert_eq!(shorten_urls(&urls).await["k"], "");
    }
}
