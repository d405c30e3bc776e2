use chrono::Local;

pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

impl Level {
    /// ANSI 颜色与四字母标签
    fn style(&self) -> (&'static str, &'static str) {
        match self {
            Level::Info => ("\x1b[32m", "INFO"),  // Green
            Level::Warn => ("\x1b[33m", "WARN"),  // Yellow
            Level::Error => ("\x1b[31m", "ERRO"), // Red
            Level::Debug => ("\x1b[34m", "DEBG"), // Blue
        }
    }
}

const GRAY: &str = "\x1b[90m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// 统一日志输出函数
/// 格式: [Time] [LEVEL] [Target    ] Message
///
/// 输出到 stderr，避免干扰调用方的标准输出。
pub fn print(level: Level, target: &str, args: std::fmt::Arguments) {
    let now = Local::now().format("%H:%M:%S");
    let (color, tag) = level.style();

    eprintln!(
        "{GRAY}[{now}] {color}[{tag}]{RESET} {CYAN}[{target:<10}]{RESET} {args}"
    );
}

// 各级别宏共用的展开，默认 target 为 "DataCard"
#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:ident, target: $target:expr, $($arg:tt)+) => (
        $crate::log::print($crate::log::Level::$level, $target, format_args!($($arg)+))
    );
    ($level:ident, $($arg:tt)+) => (
        $crate::log::print($crate::log::Level::$level, "DataCard", format_args!($($arg)+))
    );
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => ($crate::__log!(Info, $($arg)+));
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => ($crate::__log!(Warn, $($arg)+));
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => ($crate::__log!(Error, $($arg)+));
}

/// 仅在 debug 构建中输出
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => (
        if cfg!(debug_assertions) {
            $crate::__log!(Debug, $($arg)+)
        }
    );
}
