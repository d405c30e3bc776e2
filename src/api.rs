use crate::config::GatewayConfig;
use crate::{DataCardError, DataCardResult, debug, error, warn};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// 统一响应封装 `{success, error?, data?}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn fail(error: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data,
        }
    }
}

impl From<DataCardResult<Value>> for ApiResponse {
    fn from(result: DataCardResult<Value>) -> Self {
        match result {
            Ok(data) => ApiResponse::ok(data),
            Err(DataCardError::Gateway { status, body }) => {
                ApiResponse::fail(format!("HTTP {}", status), Some(body))
            }
            Err(e) => ApiResponse::fail(e.to_string(), None),
        }
    }
}

/// OneBot v11 HTTP 网关客户端
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// 更新地址或令牌，规则见 [`GatewayConfig::updated`]
    pub fn update_config(&mut self, base_url: Option<&str>, access_token: Option<&str>) {
        self.config = self.config.updated(base_url, access_token);
    }

    /// 调用网关动作，失败时返回 `success: false` 而不是错误
    pub async fn post<P: Serialize>(
        &self,
        action: &str,
        params: &P,
        timeout: Duration,
    ) -> ApiResponse {
        let result = self.call(action, params, timeout).await;
        match &result {
            Err(e @ DataCardError::Transport(_)) => {
                error!(target: "Gateway", "{} 无法连接网关: {}", action, e)
            }
            Err(e) => warn!(target: "Gateway", "{} 调用失败: {}", action, e),
            Ok(_) => {}
        }
        result.into()
    }

    async fn call<P: Serialize>(
        &self,
        action: &str,
        params: &P,
        timeout: Duration,
    ) -> DataCardResult<Value> {
        let url = self.config.endpoint(action);
        debug!(target: "Gateway", "POST {}", url);

        let mut req = self.client.post(&url).json(params).timeout(timeout);
        if let Some(bearer) = self.config.bearer() {
            req = req.header("Authorization", bearer);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = parse_body(&resp.text().await?);

        if status.is_success() {
            Ok(body)
        } else {
            Err(DataCardError::Gateway {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Default for GatewayClient {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

// 非 JSON 响应保留原始文本
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
