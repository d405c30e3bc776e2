use crate::message::{ContentItem, MessageBlock, resolve_media_source};
use regex::Regex;
use std::sync::OnceLock;

static IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn image_regex() -> &'static Regex {
    IMAGE_REGEX.get_or_init(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("Invalid Regex"))
}

/// 将原始文本转换为合并转发消息块
///
/// 文本按 `separator` 切分为多条消息，每条消息中的 `![alt](src)` 转为图片，
/// 其余部分作为文本。空白段落被丢弃；格式不完整的图片语法按普通文本处理。
///
/// ```
/// use datacard::forward::convert;
///
/// let blocks = convert("消息1\n---\n![图片](https://a.b/c.png)\n消息2", "\n---\n");
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[1].len(), 2);
/// ```
pub fn convert(raw: &str, separator: &str) -> Vec<MessageBlock> {
    split_segments(raw, separator)
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            MessageBlock::new(tokenize(segment))
        })
        .collect()
}

// 空分隔符不切分
fn split_segments<'a>(raw: &'a str, separator: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    if separator.is_empty() {
        Box::new(std::iter::once(raw))
    } else {
        Box::new(raw.split(separator))
    }
}

fn tokenize(segment: &str) -> Vec<ContentItem> {
    let mut items = Vec::new();
    let mut last = 0;

    for caps in image_regex().captures_iter(segment) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut items, &segment[last..whole.start()]);
        let source = caps.get(1).map_or("", |m| m.as_str());
        items.push(ContentItem::image(resolve_media_source(source)));
        last = whole.end();
    }
    push_text(&mut items, &segment[last..]);

    items
}

fn push_text(items: &mut Vec<ContentItem>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        items.push(ContentItem::text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SEPARATOR;

    fn items(block: &MessageBlock) -> Vec<ContentItem> {
        block.items().to_vec()
    }

    #[test]
    fn splits_on_separator() {
        let blocks = convert("A\n---\nB", DEFAULT_SEPARATOR);
        assert_eq!(blocks.len(), 2);
        assert_eq!(items(&blocks[0]), vec![ContentItem::text("A")]);
        assert_eq!(items(&blocks[1]), vec![ContentItem::text("B")]);
    }

    #[test]
    fn isolates_inline_image() {
        let blocks = convert("hello ![img](http://x/y.png) world", DEFAULT_SEPARATOR);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            items(&blocks[0]),
            vec![
                ContentItem::text("hello"),
                ContentItem::image("http://x/y.png"),
                ContentItem::text("world"),
            ]
        );
    }

    #[test]
    fn blank_segments_are_dropped() {
        assert!(convert("   \n---\n   ", DEFAULT_SEPARATOR).is_empty());
        assert!(convert("", DEFAULT_SEPARATOR).is_empty());
        assert_eq!(convert("\n---\nX\n---\n\n---\n", DEFAULT_SEPARATOR).len(), 1);
    }

    #[test]
    fn mixed_blocks_keep_order() {
        let raw = "消息1\n---\n![图片](https://img.example/a.png)\n消息2\n---\n消息3";
        let blocks = convert(raw, DEFAULT_SEPARATOR);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            items(&blocks[1]),
            vec![
                ContentItem::image("https://img.example/a.png"),
                ContentItem::text("消息2"),
            ]
        );
        assert_eq!(items(&blocks[2]), vec![ContentItem::text("消息3")]);
    }

    #[test]
    fn adjacent_images_are_separate_items() {
        let blocks = convert("![a](https://a/1.png)![b](https://a/2.png)", DEFAULT_SEPARATOR);
        assert_eq!(
            items(&blocks[0]),
            vec![
                ContentItem::image("https://a/1.png"),
                ContentItem::image("https://a/2.png"),
            ]
        );
    }

    #[test]
    fn malformed_image_stays_text() {
        let blocks = convert("look ![broken](http://x/y.png", DEFAULT_SEPARATOR);
        assert_eq!(
            items(&blocks[0]),
            vec![ContentItem::text("look ![broken](http://x/y.png")]
        );
    }

    #[test]
    fn missing_local_image_becomes_empty_source() {
        let blocks = convert("![x](no/such/file.png)", DEFAULT_SEPARATOR);
        assert_eq!(items(&blocks[0]), vec![ContentItem::image("")]);
    }

    #[test]
    fn custom_and_empty_separator() {
        assert_eq!(convert("a||b||c", "||").len(), 3);
        let whole = convert("a\n---\nb", "");
        assert_eq!(whole.len(), 1);
        assert_eq!(items(&whole[0]), vec![ContentItem::text("a\n---\nb")]);
    }
}
