//! 结果合并服务 - 业务能力层
//!
//! 引擎状态为 completed 之后才拉取该引擎的逐页结果；翻页只做查找，不发请求。

use std::collections::HashMap;
use tracing::{debug, info};

use crate::clients::OcrApi;
use crate::error::AppResult;
use crate::models::{OcrEngine, OcrResultItem, OcrStatusResponse, RequestStatus};

/// 已拉取的结果，按引擎保存，并记录对应的请求 ID
#[derive(Debug, Default)]
pub struct ResultMerger {
    results: HashMap<OcrEngine, (u64, Vec<OcrResultItem>)>,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据最新状态决定是否拉取结果
    ///
    /// # 返回
    /// 本次是否发出了请求
    pub async fn refresh(
        &mut self,
        api: &dyn OcrApi,
        engine: OcrEngine,
        request_id: u64,
        status: Option<&OcrStatusResponse>,
    ) -> AppResult<bool> {
        let completed = matches!(status, Some(s) if s.status == RequestStatus::Completed);
        if !completed {
            return Ok(false);
        }
        if matches!(self.results.get(&engine), Some((cached_id, _)) if *cached_id == request_id) {
            return Ok(false);
        }

        let items = api.get_result(engine, request_id).await?;
        info!("✓ {} 结果已获取，共 {} 页", engine, items.len());
        self.results.insert(engine, (request_id, items));
        Ok(true)
    }

    pub fn has_results(&self, engine: OcrEngine) -> bool {
        self.results.contains_key(&engine)
    }

    /// 指定引擎某一页的文本，没有结果时返回空字符串
    pub fn text_for_page(&self, engine: OcrEngine, page: u32) -> &str {
        let text = self
            .results
            .get(&engine)
            .and_then(|(_, items)| items.iter().find(|item| item.page_number == page))
            .map(|item| item.text.as_str())
            .unwrap_or("");
        if text.is_empty() {
            debug!("{} 第 {} 页没有文本", engine, page);
        }
        text
    }

    /// 四个引擎在某一页的文本
    pub fn texts_for_page(&self, page: u32) -> [(OcrEngine, &str); 4] {
        OcrEngine::ALL.map(|engine| (engine, self.text_for_page(engine, page)))
    }
}
