use serde::{Deserialize, Serialize};
use std::path::Path;

/// 消息段 (Segment)
///
/// OneBot v11 的通用线格式 `{"type": ..., "data": {...}}`
#[derive(Debug, Serialize, Clone)]
pub struct Segment<T> {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub data: T,
}

impl<T> Segment<T> {
    pub fn new(type_: &'static str, data: T) -> Self {
        Self { type_, data }
    }
}

/// 转发节点内的单条内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ContentItem {
    /// 纯文本
    Text { text: String },
    /// 图片
    /// - `file`: URL 或 `file://` 路径，无法解析的本地路径为空字符串
    Image { file: String },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    pub fn image(file: impl Into<String>) -> Self {
        ContentItem::Image { file: file.into() }
    }
}

/// 一条转发消息 (由分隔符切分出的一段)，内容永不为空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct MessageBlock {
    content: Vec<ContentItem>,
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    content: Vec<ContentItem>,
}

impl TryFrom<RawBlock> for MessageBlock {
    type Error = &'static str;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        MessageBlock::new(raw.content).ok_or("message block content must not be empty")
    }
}

impl MessageBlock {
    /// 空内容返回 `None`
    pub fn new(content: Vec<ContentItem>) -> Option<Self> {
        if content.is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.content
    }

    /// 内容项数量，至少为 1
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.content.len()
    }
}

/// 规范化媒体路径
///
/// 网络地址与 `file://` / `base64://` 原样返回；存在的本地文件转为绝对 `file://` URL；
/// 其余情况返回空字符串。
pub fn resolve_media_source(source: &str) -> String {
    const PASSTHROUGH: [&str; 4] = ["http://", "https://", "file://", "base64://"];
    if PASSTHROUGH.iter().any(|p| source.starts_with(p)) {
        return source.to_string();
    }

    let path = Path::new(source);
    if !source.is_empty() && path.is_file() {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        if let Ok(url) = url::Url::from_file_path(&absolute) {
            return url.to_string();
        }
    }
    String::new()
}
