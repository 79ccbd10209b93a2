//! 文档导入服务 - 业务能力层
//!
//! 校验导入表单后调用 `POST /admin/process-document`，后续处理由外部完成

use tracing::info;

use crate::clients::OcrApi;
use crate::error::{AppError, AppResult};
use crate::models::ProcessDocumentRequest;

/// 单个文档最多处理的页数
pub const MAX_PAGES_LIMIT: u32 = 500;
/// 未指定时的默认页数
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// 校验并构建导入请求
pub fn build_ingest_request(
    title: &str,
    ia_link: &str,
    barcode: &str,
    max_pages: Option<u32>,
) -> AppResult<ProcessDocumentRequest> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("标题不能为空"));
    }

    let ia_link = ia_link.trim();
    if url::Url::parse(ia_link).is_err() {
        return Err(AppError::validation(format!("不是合法的 URL: {}", ia_link)));
    }

    let barcode: u64 = barcode
        .trim()
        .parse()
        .ok()
        .filter(|b| *b > 0)
        .ok_or_else(|| AppError::validation(format!("barcode 必须是正整数: {}", barcode)))?;

    let max_pages = max_pages.unwrap_or(DEFAULT_MAX_PAGES);
    if !(1..=MAX_PAGES_LIMIT).contains(&max_pages) {
        return Err(AppError::validation(format!(
            "max_pages 必须在 1 到 {} 之间: {}",
            MAX_PAGES_LIMIT, max_pages
        )));
    }

    Ok(ProcessDocumentRequest {
        title: title.to_string(),
        ia_link: ia_link.to_string(),
        barcode,
        max_pages,
    })
}

/// 发起文档导入
pub async fn ingest_document(api: &dyn OcrApi, request: &ProcessDocumentRequest) -> AppResult<()> {
    info!(
        "📄 发起文档导入: \"{}\" (barcode {}, 最多 {} 页)",
        request.title, request.barcode, request.max_pages
    );
    api.process_document(request).await?;
    info!("✓ 文档 \"{}\" 已开始处理", request.title);
    Ok(())
}
