//! 合并转发消息
//!
//! 支持两种模式：
//! - `single`: 所有内容合并到同一个节点
//! - `multi`: 每条消息作为独立节点（默认）

use crate::api::{ApiResponse, GatewayClient};
use crate::config::{self, ForwardConfig, GatewayConfig};
use crate::message::{ContentItem, MessageBlock, Segment};
use crate::{debug, info};
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;
use std::time::Duration;

mod convert;

pub use convert::convert;

const FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

/// 节点构建模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardMode {
    Single,
    #[default]
    Multi,
}

impl FromStr for ForwardMode {
    type Err = std::convert::Infallible;

    /// 无法识别的模式按 `multi` 处理
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("single") {
            ForwardMode::Single
        } else {
            ForwardMode::Multi
        })
    }
}

/// 转发消息节点 - 自定义内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardNode {
    pub user_id: String,
    pub nickname: String,
    pub content: Vec<ContentItem>,
}

#[derive(Serialize)]
struct NodeData<'a> {
    user_id: &'a str,
    nickname: &'a str,
    content: &'a [ContentItem],
}

impl Serialize for ForwardNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Segment::new(
            "node",
            NodeData {
                user_id: &self.user_id,
                nickname: &self.nickname,
                content: &self.content,
            },
        )
        .serialize(serializer)
    }
}

/// 按模式构建节点，返回节点列表与内容条数
///
/// `multi` 模式下条数为节点数，`single` 模式下为全部内容项数量。
pub fn build_nodes(
    blocks: &[MessageBlock],
    mode: ForwardMode,
    user_id: &str,
    nickname: &str,
) -> (Vec<ForwardNode>, usize) {
    let node = |content: Vec<ContentItem>| ForwardNode {
        user_id: user_id.to_string(),
        nickname: nickname.to_string(),
        content,
    };

    match mode {
        ForwardMode::Single => {
            let content: Vec<ContentItem> = blocks
                .iter()
                .flat_map(|b| b.items().iter().cloned())
                .collect();
            let count = content.len();
            (vec![node(content)], count)
        }
        ForwardMode::Multi => {
            let nodes: Vec<ForwardNode> = blocks
                .iter()
                .map(|b| node(b.items().to_vec()))
                .collect();
            let count = nodes.len();
            (nodes, count)
        }
    }
}

/// `send_forward_msg` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct ForwardRequest {
    pub group_id: i64,
    pub messages: Vec<ForwardNode>,
    pub prompt: String,
    pub summary: String,
    pub source: String,
}

impl ForwardRequest {
    /// 摘要固定追加 ` | 共{n}条内容`
    pub fn new(
        group_id: i64,
        messages: Vec<ForwardNode>,
        item_count: usize,
        prompt: impl Into<String>,
        summary: &str,
        source: impl Into<String>,
    ) -> Self {
        Self {
            group_id,
            messages,
            prompt: prompt.into(),
            summary: format!("{} | 共{}条内容", summary, item_count),
            source: source.into(),
        }
    }

    /// 从消息块与选项直接组装
    pub fn build(group_id: i64, blocks: &[MessageBlock], options: &ForwardOptions) -> Self {
        let (nodes, count) = build_nodes(blocks, options.mode, &options.user_id, &options.nickname);
        Self::new(
            group_id,
            nodes,
            count,
            options.prompt.as_str(),
            &options.summary,
            options.source.as_str(),
        )
    }
}

/// 转发卡片展示参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOptions {
    /// 卡片标题（显示在聊天列表）
    pub prompt: String,
    /// 卡片摘要
    pub summary: String,
    /// 转发来源
    pub source: String,
    /// 虚拟发送者 QQ
    pub user_id: String,
    /// 虚拟发送者昵称
    pub nickname: String,
    pub mode: ForwardMode,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self {
            prompt: config::default_prompt(),
            summary: config::default_summary(),
            source: config::default_source(),
            user_id: config::default_user_id(),
            nickname: config::default_nickname(),
            mode: ForwardMode::default(),
        }
    }
}

impl From<&ForwardConfig> for ForwardOptions {
    fn from(c: &ForwardConfig) -> Self {
        Self {
            prompt: c.prompt.clone(),
            summary: c.summary.clone(),
            source: c.source.clone(),
            user_id: c.user_id.clone(),
            nickname: c.nickname.clone(),
            mode: c.mode,
        }
    }
}

impl ForwardOptions {
    pub fn mode(mut self, mode: ForwardMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sender(mut self, user_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.nickname = nickname.into();
        self
    }

    pub fn card(
        mut self,
        prompt: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.prompt = prompt.into();
        self.summary = summary.into();
        self.source = source.into();
        self
    }
}

/// 合并转发消息发送器
#[derive(Debug, Clone, Default)]
pub struct ForwardMessageSender {
    client: GatewayClient,
}

impl ForwardMessageSender {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: GatewayClient::new(config),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        self.client.config()
    }

    pub fn update_config(&mut self, base_url: Option<&str>, access_token: Option<&str>) {
        self.client.update_config(base_url, access_token);
    }

    /// 发送合并转发消息
    pub async fn send_forward(
        &self,
        group_id: i64,
        blocks: &[MessageBlock],
        options: &ForwardOptions,
    ) -> ApiResponse {
        let request = ForwardRequest::build(group_id, blocks, options);
        debug!(
            target: "Forward",
            "群 {} 发送合并转发: {} 个节点, {}",
            group_id,
            request.messages.len(),
            request.summary
        );

        let resp = self
            .client
            .post("send_forward_msg", &request, FORWARD_TIMEOUT)
            .await;
        if resp.success {
            info!(target: "Forward", "群 {} 合并转发发送成功", group_id);
        }
        resp
    }

    /// 将原始文本转换后发送
    pub async fn send_text(
        &self,
        group_id: i64,
        raw: &str,
        separator: &str,
        options: &ForwardOptions,
    ) -> ApiResponse {
        let blocks = convert(raw, separator);
        self.send_forward(group_id, &blocks, options).await
    }
}

/// 快速发送合并转发消息
pub async fn send_forward_message(
    group_id: i64,
    blocks: &[MessageBlock],
    options: &ForwardOptions,
    gateway: GatewayConfig,
) -> ApiResponse {
    ForwardMessageSender::new(gateway)
        .send_forward(group_id, blocks, options)
        .await
}

/// 将原始文本转换为合并转发格式
pub fn convert_message_to_forward(raw: &str, separator: &str) -> Vec<MessageBlock> {
    convert(raw, separator)
}
