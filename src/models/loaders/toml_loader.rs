use crate::error::{AppError, AppResult, FileError};
use crate::models::{EngineOptions, EvaluationDraft};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 读取并解析一个 TOML 文件
async fn load_toml<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })
    })
}

/// 从 TOML 文件加载引擎参数，未写出的字段使用默认值
pub async fn load_engine_options(path: &Path) -> AppResult<EngineOptions> {
    let options: EngineOptions = load_toml(path).await?;
    tracing::info!("已加载引擎参数: {}", path.display());
    Ok(options)
}

/// 从 TOML 文件加载评估草稿
pub async fn load_evaluation_draft(path: &Path) -> AppResult<EvaluationDraft> {
    let mut draft: EvaluationDraft = load_toml(path).await?;

    // 草稿文件里的提交标记不可信，是否已提交只由后端决定
    draft.evaluation_submitted = false;

    tracing::debug!(
        "已加载评估草稿 {}，缺失 {} 个字段",
        path.display(),
        draft.missing_fields().len()
    );
    Ok(draft)
}
