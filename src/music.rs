//! 音乐卡片

use crate::api::{ApiResponse, GatewayClient};
use crate::config::GatewayConfig;
use crate::message::Segment;
use crate::{debug, info};
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::time::Duration;

const MUSIC_TIMEOUT: Duration = Duration::from_secs(10);

/// 音乐平台
///
/// 未知平台原样透传，由网关判断是否支持。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicPlatform {
    QQ,
    NetEase,
    Xiami,
    Other(String),
}

impl MusicPlatform {
    pub fn as_str(&self) -> &str {
        match self {
            MusicPlatform::QQ => "qq",
            MusicPlatform::NetEase => "163",
            MusicPlatform::Xiami => "xm",
            MusicPlatform::Other(s) => s,
        }
    }
}

impl From<&str> for MusicPlatform {
    fn from(s: &str) -> Self {
        match s {
            "qq" => MusicPlatform::QQ,
            "163" => MusicPlatform::NetEase,
            "xm" => MusicPlatform::Xiami,
            other => MusicPlatform::Other(other.to_string()),
        }
    }
}

/// 自定义音乐卡片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMusic {
    pub title: String,
    /// 音频直链
    pub audio: String,
    /// 点击卡片跳转链接
    pub url: String,
    /// 封面
    pub image: Option<String>,
    /// 描述
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicSegment {
    Custom(CustomMusic),
    Platform { platform: MusicPlatform, id: String },
}

impl MusicSegment {
    /// 空字符串的可选字段视为未提供
    pub fn custom(
        title: impl Into<String>,
        audio: impl Into<String>,
        url: impl Into<String>,
        image: Option<String>,
        content: Option<String>,
    ) -> Self {
        MusicSegment::Custom(CustomMusic {
            title: title.into(),
            audio: audio.into(),
            url: url.into(),
            image: image.filter(|s| !s.is_empty()),
            content: content.filter(|s| !s.is_empty()),
        })
    }

    pub fn platform(platform: impl Into<MusicPlatform>, id: impl ToString) -> Self {
        MusicSegment::Platform {
            platform: platform.into(),
            id: id.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CustomData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    url: &'a str,
    audio: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Serialize)]
struct PlatformData<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    id: &'a str,
}

// 空字符串等同于未提供
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Serialize for MusicSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MusicSegment::Custom(m) => Segment::new(
                "music",
                CustomData {
                    kind: "custom",
                    url: &m.url,
                    audio: &m.audio,
                    title: &m.title,
                    content: non_empty(&m.content),
                    image: non_empty(&m.image),
                },
            )
            .serialize(serializer),
            MusicSegment::Platform { platform, id } => Segment::new(
                "music",
                PlatformData {
                    kind: platform.as_str(),
                    id,
                },
            )
            .serialize(serializer),
        }
    }
}

/// 发送目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    Group(i64),
    Private(i64),
}

impl MessageTarget {
    /// `"group"` 为群聊，其余均视为私聊
    pub fn from_kind(kind: &str, id: i64) -> Self {
        if kind == "group" {
            MessageTarget::Group(id)
        } else {
            MessageTarget::Private(id)
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            MessageTarget::Group(_) => "/send_group_msg",
            MessageTarget::Private(_) => "/send_private_msg",
        }
    }
}

/// 网关请求：端点 + 请求体
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub endpoint: &'static str,
    pub payload: Value,
}

/// 根据目标选择端点并组装消息体
pub fn route_message(target: MessageTarget, segment: &MusicSegment) -> OutboundRequest {
    let payload = match target {
        MessageTarget::Group(id) => json!({ "group_id": id, "message": [segment] }),
        MessageTarget::Private(id) => json!({ "user_id": id, "message": [segment] }),
    };
    OutboundRequest {
        endpoint: target.endpoint(),
        payload,
    }
}

/// 音乐卡片发送器
#[derive(Debug, Clone, Default)]
pub struct MusicCardSender {
    client: GatewayClient,
}

impl MusicCardSender {
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

    pub async fn send_segment(&self, target: MessageTarget, segment: &MusicSegment) -> ApiResponse {
        let request = route_message(target, segment);
        debug!(target: "Music", "{} {:?}", request.endpoint, target);

        let resp = self
            .client
            .post(request.endpoint, &request.payload, MUSIC_TIMEOUT)
            .await;
        if resp.success {
            info!(target: "Music", "音乐卡片已发送 -> {:?}", target);
        }
        resp
    }

    /// 发送自定义音乐卡片
    pub async fn send_custom_music_card(
        &self,
        target: MessageTarget,
        title: &str,
        audio_url: &str,
        jump_url: &str,
        image_url: Option<String>,
        content: Option<String>,
    ) -> ApiResponse {
        let segment = MusicSegment::custom(title, audio_url, jump_url, image_url, content);
        self.send_segment(target, &segment).await
    }

    /// 发送平台音乐卡片 (qq / 163 / xm)
    pub async fn send_platform_music_card(
        &self,
        target: MessageTarget,
        platform: &str,
        music_id: &str,
    ) -> ApiResponse {
        let segment = MusicSegment::platform(platform, music_id);
        self.send_segment(target, &segment).await
    }
}

/// 快速发送自定义音乐卡片
pub async fn send_music_card(
    target: MessageTarget,
    music: CustomMusic,
    gateway: GatewayConfig,
) -> ApiResponse {
    MusicCardSender::new(gateway)
        .send_segment(target, &MusicSegment::Custom(music))
        .await
}
