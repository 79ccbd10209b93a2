use crate::error::{AppResult, ConfigError};
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// OCR 任务 API 地址
    pub ocr_api_base_url: String,
    /// 存储后端地址（PostgREST + 对象存储）
    pub store_url: String,
    /// 存储后端 API key
    pub store_api_key: String,
    /// 页面图片所在的存储桶
    pub image_bucket: String,
    /// 状态轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 单个 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// watch 命令最多轮询的次数
    pub max_poll_rounds: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 引擎参数 TOML 文件（可选）
    pub engine_options_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr_api_base_url: "http://localhost:8000".to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_api_key: String::new(),
            image_bucket: "ia_bucket".to_string(),
            poll_interval_secs: 3,
            request_timeout_secs: 30,
            max_poll_rounds: 600,
            verbose_logging: false,
            output_log_file: "ocr_eval.log".to_string(),
            engine_options_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            ocr_api_base_url: std::env::var("OCR_API_BASE_URL").unwrap_or(default.ocr_api_base_url),
            store_url: std::env::var("STORE_URL").unwrap_or(default.store_url),
            store_api_key: std::env::var("STORE_API_KEY").unwrap_or(default.store_api_key),
            image_bucket: std::env::var("IMAGE_BUCKET").unwrap_or(default.image_bucket),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_secs),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            max_poll_rounds: std::env::var("MAX_POLL_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_poll_rounds),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            engine_options_file: std::env::var("ENGINE_OPTIONS_FILE").ok().filter(|v| !v.is_empty()),
        }
    }

    /// 检查地址与数值配置
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("OCR_API_BASE_URL", &self.ocr_api_base_url),
            ("STORE_URL", &self.store_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    name,
                    value: value.clone(),
                }
                .into());
            }
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroValue { name: "POLL_INTERVAL_SECS" }.into());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue { name: "REQUEST_TIMEOUT_SECS" }.into());
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_bad_url_and_zero_interval() {
        let config = Config {
            store_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppError::Config(ConfigError::InvalidUrl { name: "STORE_URL", .. }))
        ));

        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppError::Config(ConfigError::ZeroValue { .. }))
        ));
    }
}
