use thiserror::Error;

use crate::models::OcrEngine;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// OCR 任务 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 存储后端错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 多引擎提交错误
    #[error("提交错误: {0}")]
    Submission(#[from] SubmissionError),
    /// 评估表单错误
    #[error("评估错误: {0}")]
    Evaluation(#[from] EvaluationError),
    /// 参数校验错误
    #[error("参数错误: {0}")]
    Validation(String),
    /// 资源不存在
    #[error("未找到 {kind}: {id}")]
    NotFound { kind: &'static str, id: String },
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// OCR 任务 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非成功状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 响应体解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 存储后端错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 网络请求失败
    #[error("查询 {table} 失败: {source}")]
    QueryFailed {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    /// 后端返回错误
    #[error("查询 {table} 返回错误: status={status}, body={body}")]
    BadResponse {
        table: String,
        status: u16,
        body: String,
    },
}

/// 多引擎提交错误
///
/// 提交不做补偿：已成功的请求会保留在后端，记录在 `orphaned` 中。
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{} 个引擎提交失败: {}", .failures.len(), describe_failures(.failures))]
    EnginesFailed {
        failures: Vec<(OcrEngine, String)>,
        orphaned: Vec<(OcrEngine, u64)>,
    },
}

fn describe_failures(failures: &[(OcrEngine, String)]) -> String {
    failures
        .iter()
        .map(|(engine, msg)| format!("{} ({})", engine, msg))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 评估表单错误
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// 必填字段缺失
    #[error("请填写所有必填字段: {}", .missing.join(", "))]
    MissingFields { missing: Vec<&'static str> },
    /// 评分超出 1-5 范围
    #[error("{field} 评分 {value} 超出范围 [1, 5]")]
    InvalidRating { field: &'static str, value: u8 },
    /// 已提交的评估不能再修改
    #[error("{engine} 任务 {job_id} 的评估已提交，不能修改")]
    AlreadySubmitted { engine: OcrEngine, job_id: u64 },
    /// 当前页没有对应的任务
    #[error("无法提交评估: {engine} 在第 {page} 页没有任务")]
    MissingJob { engine: OcrEngine, page: u32 },
    /// 提交到后端失败
    #[error("{} 评估提交失败: {source}", .engine.label())]
    SubmitFailed {
        engine: OcrEngine,
        #[source]
        source: Box<AppError>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL 不合法
    #[error("{name} 不是合法的 URL: '{value}'")]
    InvalidUrl { name: &'static str, value: String },
    /// 数值配置不合法
    #[error("{name} 必须大于 0")]
    ZeroValue { name: &'static str },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建存储查询失败错误
    pub fn store_query_failed(table: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Store(StoreError::QueryFailed {
            table: table.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建资源不存在错误
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// 创建参数校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_every_field() {
        let err = AppError::from(EvaluationError::MissingFields {
            missing: vec!["format_quality", "hallucination_comment"],
        });
        let msg = err.to_string();
        assert!(msg.contains("format_quality, hallucination_comment"));
    }

    #[test]
    fn submission_error_names_failed_engines() {
        let err = SubmissionError::EnginesFailed {
            failures: vec![(OcrEngine::Marker, "timeout".to_string())],
            orphaned: vec![(OcrEngine::Tesseract, 7)],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("1 个引擎提交失败"));
        assert!(msg.contains("marker (timeout)"));
    }
}
