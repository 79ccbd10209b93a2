//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use chrono::{DateTime, NaiveDateTime};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppResult, FileError};

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先；否则默认 info，verbose 时为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\nOCR 评估日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    std::fs::write(log_file_path, log_header).map_err(|source| FileError::WriteFailed {
        path: log_file_path.to_string(),
        source,
    })?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!("🌐 OCR 服务: {}", config.ocr_api_base_url);
    info!("⏱️ 轮询间隔: {} 秒", config.poll_interval_secs);
    info!("{}", "=".repeat(60));
}

/// 记录提交结果
///
/// # 参数
/// - `token`: 编码后的请求令牌
/// - `document_id`: 文档 ID
pub fn log_submission(token: &str, document_id: &str) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 四个引擎均已受理");
    info!("📄 文档: {}", document_id);
    info!("🔑 请求令牌: {}", token);
    info!("{}", "─".repeat(60));
}

/// 打印任务列表统计
pub fn print_jobs_summary(shown: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 请求分组: 显示 {}/{}", shown, total);
    info!("{}", "=".repeat(60));
}

/// 打印评估会话结束时的统计
pub fn print_session_stats(completed: usize, submitted: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评估会话结束");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已完成引擎: {}/4", completed);
    info!("📝 本次提交评估: {}", submitted);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

const DISPLAY_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// 格式化后端返回的时间戳，例如 `Mar 4, 2025 5:06 AM`；无法解析时原样返回
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    raw.to_string()
}
