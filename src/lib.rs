// lib.rs
//
// ================================================================================
// DataCard - OneBot v11 消息卡片工具集
//
// 功能：音乐卡片 | 合并转发消息 | 短链接
// 架构：无状态 HTTP 调用 | 统一响应封装 | 原子配置
// ================================================================================

use std::fmt;

pub mod api;
pub mod config;
pub mod forward;
pub mod log;
pub mod message;
pub mod music;
pub mod shortener;

pub use api::{ApiResponse, GatewayClient};
pub use config::{AppConfig, GatewayConfig};
pub use forward::{
    ForwardMessageSender, ForwardMode, ForwardNode, ForwardOptions, ForwardRequest,
    convert_message_to_forward, send_forward_message,
};
pub use message::{ContentItem, MessageBlock};
pub use music::{CustomMusic, MessageTarget, MusicCardSender, MusicPlatform, MusicSegment};
pub use shortener::{ShortenMethod, ShortenerService, UrlShortener, shorten_url, shorten_urls};

// ============================================================================
// Error Types (统一错误处理)
// ============================================================================

/// 框架核心错误类型
#[derive(Debug)]
pub enum DataCardError {
    /// 连接失败、DNS 解析失败、超时等传输层错误
    Transport(String),
    /// 网关返回非 2xx 状态码，body 作为诊断信息保留
    Gateway {
        status: u16,
        body: serde_json::Value,
    },
    /// 单个短链接服务失败 (只记录日志，不向调用方抛出)
    Provider { service: String, reason: String },
}

pub type DataCardResult<T> = Result<T, DataCardError>;

impl fmt::Display for DataCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataCardError::Transport(msg) => write!(f, "{}", msg),
            DataCardError::Gateway { status, .. } => write!(f, "HTTP {}", status),
            DataCardError::Provider { service, reason } => {
                write!(f, "shortener {} failed: {}", service, reason)
            }
        }
    }
}

impl std::error::Error for DataCardError {}

impl From<reqwest::Error> for DataCardError {
    fn from(e: reqwest::Error) -> Self {
        DataCardError::Transport(e.to_string())
    }
}

/// 常用类型一次性导入
pub mod prelude {
    pub use crate::api::{ApiResponse, GatewayClient};
    pub use crate::config::{AppConfig, GatewayConfig};
    pub use crate::forward::{ForwardMessageSender, ForwardMode, ForwardOptions};
    pub use crate::message::{ContentItem, MessageBlock};
    pub use crate::music::{MessageTarget, MusicCardSender, MusicSegment};
    pub use crate::shortener::UrlShortener;
    pub use crate::{DataCardError, DataCardResult};
}
