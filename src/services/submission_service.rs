//! 多引擎提交服务 - 业务能力层
//!
//! 只负责"把同一页码范围同时交给四个引擎"，不关心之后的轮询与评估

use futures::future::join_all;
use tracing::{info, warn};

use crate::clients::OcrApi;
use crate::error::{AppError, AppResult, SubmissionError};
use crate::models::{EngineOptions, OcrEngine, PageRange};

/// 多引擎提交服务
///
/// 职责：
/// - 校验 barcode 与页码范围
/// - 并发发出四个启动请求，等待全部结束（不提前短路）
/// - 全部成功才返回请求 ID；任一失败则整体失败，不重试、不补偿
pub struct SubmissionService {
    options: EngineOptions,
}

impl SubmissionService {
    /// 创建新的提交服务
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// 提交到全部四个引擎
    ///
    /// # 返回
    /// 按 tesseract, marker, olmocr, smoldocling 顺序排列的请求 ID
    pub async fn submit_all(
        &self,
        api: &dyn OcrApi,
        barcode: &str,
        range: PageRange,
    ) -> AppResult<[u64; 4]> {
        validate(barcode, range)?;

        info!(
            "📤 提交 OCR 请求: barcode={} 页码={} 引擎数={}",
            barcode,
            range,
            OcrEngine::ALL.len()
        );

        let calls = OcrEngine::ALL
            .iter()
            .map(|engine| api.start_ocr(*engine, barcode, range, &self.options));
        let outcomes = join_all(calls).await;

        let mut ids = [0u64; 4];
        let mut succeeded = Vec::new();
        let mut failures = Vec::new();

        for (engine, outcome) in OcrEngine::ALL.iter().zip(outcomes) {
            match outcome {
                Ok(response) => {
                    info!("✓ {} 已受理，请求 ID {}", engine, response.request_id);
                    ids[engine.index()] = response.request_id;
                    succeeded.push((*engine, response.request_id));
                }
                Err(e) => {
                    warn!("❌ {} 提交失败: {}", engine, e);
                    failures.push((*engine, e.to_string()));
                }
            }
        }

        if failures.is_empty() {
            return Ok(ids);
        }

        if !succeeded.is_empty() {
            warn!(
                "⚠️ 以下请求已在后端创建但不会被使用: {:?}",
                succeeded
            );
        }

        Err(SubmissionError::EnginesFailed {
            failures,
            orphaned: succeeded,
        }
        .into())
    }
}

fn validate(barcode: &str, range: PageRange) -> AppResult<()> {
    if barcode.trim().is_empty() {
        return Err(AppError::validation("barcode 不能为空"));
    }
    if range.first == 0 {
        return Err(AppError::validation("起始页必须从 1 开始"));
    }
    if range.first > range.last {
        return Err(AppError::validation(format!(
            "起始页 {} 大于结束页 {}",
            range.first, range.last
        )));
    }
    Ok(())
}
