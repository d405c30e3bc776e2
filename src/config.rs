use crate::forward::ForwardMode;
use crate::shortener::{ShortenerService, default_services};
use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tokio::fs;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    // OneBot HTTP 网关
    #[serde(default)]
    pub gateway: GatewayConfig,

    // 合并转发默认参数
    #[serde(default)]
    pub forward: ForwardConfig,

    // 短链接服务
    #[serde(default)]
    pub shortener: ShortenerConfig,
}

impl AppConfig {
    /// 读取配置文件，不存在时先写入默认配置
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let exists = fs::try_exists(path)
            .await
            .with_context(|| format!("检查配置文件失败: {}", path.display()))?;
        if !exists {
            let config = Self::default();
            config.save(path).await?;
            crate::info!(target: "Config", "已生成默认配置文件: {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), toml_string)
            .await
            .with_context(|| format!("写入配置文件失败: {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// 网关连接配置
///
/// 不可变值：更新时通过 [`GatewayConfig::updated`] 生成新配置。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url", deserialize_with = "deserialize_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }

    /// 返回更新后的配置
    /// - `base_url`: 非空时替换
    /// - `access_token`: `Some("")` 移除鉴权，`Some(t)` 设置，`None` 保持不变
    pub fn updated(&self, base_url: Option<&str>, access_token: Option<&str>) -> Self {
        let base_url = match base_url {
            Some(url) if !url.is_empty() => normalize_base_url(url),
            _ => self.base_url.clone(),
        };
        let access_token = match access_token {
            Some("") => None,
            Some(token) => Some(token.to_string()),
            None => self.access_token.clone(),
        };
        Self {
            base_url,
            access_token,
        }
    }

    /// Authorization 头的值
    pub fn bearer(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }

    pub fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            action.trim_start_matches('/')
        )
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// 配置文件中的地址同样去掉结尾的 `/`
fn deserialize_base_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let url = String::deserialize(deserializer)?;
    Ok(normalize_base_url(&url))
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForwardConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default)]
    pub mode: ForwardMode,
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            summary: default_summary(),
            source: default_source(),
            user_id: default_user_id(),
            nickname: default_nickname(),
            mode: ForwardMode::default(),
            separator: default_separator(),
        }
    }
}

pub(crate) fn default_prompt() -> String {
    "聊天记录".to_string()
}

pub(crate) fn default_summary() -> String {
    "查看消息".to_string()
}

pub(crate) fn default_source() -> String {
    "聊天记录".to_string()
}

pub(crate) fn default_user_id() -> String {
    "10000".to_string()
}

pub(crate) fn default_nickname() -> String {
    "消息助手".to_string()
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShortenerConfig {
    // 短于该长度的链接不做处理
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // 按优先级排序
    #[serde(default = "default_services")]
    pub services: Vec<ShortenerService>,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            timeout_secs: default_timeout_secs(),
            services: default_services(),
        }
    }
}

fn default_min_length() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    10
}
