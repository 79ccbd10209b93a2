//! 评估会话 - 流程层
//!
//! 对应"一个文档 + 一组请求令牌"的评估视图：
//! 1. 为四个引擎各启动一个状态轮询器
//! 2. 从第一个带页码范围的状态中确定页码范围，之后不再改变
//! 3. 引擎完成后拉取结果，按当前页查找文本
//! 4. 针对当前页的任务填写并提交评估
//!
//! 会话结束（close 或 drop）时轮询器随之停止。

use futures::future::select_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clients::OcrApi;
use crate::error::{AppError, AppResult, EvaluationError};
use crate::models::{
    EvaluationDraft, FieldUpdate, OcrEngine, OcrStatusResponse, PageRange, RequestStatus,
};
use crate::services::{EvaluationForm, ResultMerger, StatusPoller};
use crate::workflow::request_token::RequestToken;

/// 评估会话
pub struct EvalSession {
    api: Arc<dyn OcrApi>,
    document_id: String,
    token: RequestToken,
    pollers: Vec<StatusPoller>,
    receivers: Vec<watch::Receiver<Option<OcrStatusResponse>>>,
    page_range: Option<PageRange>,
    current_page: u32,
    results: ResultMerger,
    form: EvaluationForm,
}

impl EvalSession {
    /// 打开会话并启动四个轮询器
    pub fn open(
        api: Arc<dyn OcrApi>,
        document_id: impl Into<String>,
        token: RequestToken,
        poll_interval: Duration,
    ) -> Self {
        let pollers: Vec<StatusPoller> = token
            .pairs()
            .into_iter()
            .map(|(engine, request_id)| {
                StatusPoller::spawn(api.clone(), engine, request_id, poll_interval)
            })
            .collect();
        let receivers = pollers.iter().map(StatusPoller::subscribe).collect();

        let document_id = document_id.into();
        info!("🔍 打开评估会话: 文档 {} 请求 {}", document_id, token);

        Self {
            api,
            document_id,
            token,
            pollers,
            receivers,
            page_range: None,
            current_page: 1,
            results: ResultMerger::new(),
            form: EvaluationForm::new(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// 指定引擎的最新状态
    pub fn status(&self, engine: OcrEngine) -> Option<OcrStatusResponse> {
        self.pollers[engine.index()].latest()
    }

    pub fn statuses(&self) -> [(OcrEngine, Option<OcrStatusResponse>); 4] {
        OcrEngine::ALL.map(|engine| (engine, self.status(engine)))
    }

    fn request_status(&self, engine: OcrEngine) -> Option<RequestStatus> {
        self.receivers[engine.index()]
            .borrow()
            .as_ref()
            .map(|s| s.status)
    }

    /// 四个引擎是否都已完成
    pub fn is_all_completed(&self) -> bool {
        OcrEngine::ALL
            .iter()
            .all(|engine| self.request_status(*engine) == Some(RequestStatus::Completed))
    }

    /// 已完成的引擎数
    pub fn completed_engines(&self) -> usize {
        OcrEngine::ALL
            .iter()
            .filter(|engine| self.request_status(**engine) == Some(RequestStatus::Completed))
            .count()
    }

    /// 四个引擎是否都已到终态（完成或失败）
    pub fn is_all_terminal(&self) -> bool {
        OcrEngine::ALL.iter().all(|engine| {
            self.request_status(*engine)
                .map_or(false, RequestStatus::is_terminal)
        })
    }

    pub fn page_range(&self) -> Option<PageRange> {
        self.page_range
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// 翻页，页码范围已知时限制在范围内；不会发出任何请求
    pub fn set_page(&mut self, page: u32) -> u32 {
        self.current_page = match self.page_range {
            Some(range) => range.clamp(page),
            None => page,
        };
        self.current_page
    }

    /// 页码范围已知时，该页是否在范围内；范围未知时为 None
    pub fn page_in_range(&self, page: u32) -> Option<bool> {
        self.page_range.map(|range| range.contains(page))
    }

    /// 精确定位到某一页用于评估，不做截断
    ///
    /// 范围未知或不包含该页时报错，当前页保持不变
    pub fn select_page(&mut self, page: u32) -> AppResult<()> {
        match self.page_range {
            Some(range) if range.contains(page) => {
                self.current_page = page;
                Ok(())
            }
            Some(range) => Err(AppError::validation(format!(
                "第 {} 页不在请求的页码范围 {} 内",
                page, range
            ))),
            None => Err(AppError::validation(format!(
                "页码范围尚未确定，无法定位第 {} 页",
                page
            ))),
        }
    }

    /// 等待任一轮询器发布新状态
    ///
    /// # 返回
    /// 轮询器全部停止时返回 false
    pub async fn wait_for_update(&mut self) -> bool {
        let changes = self
            .receivers
            .iter_mut()
            .map(|rx| Box::pin(rx.changed()));
        let (outcome, _, _) = select_all(changes).await;
        outcome.is_ok()
    }

    /// 根据最新状态更新页码范围和结果
    pub async fn sync(&mut self) {
        if self.page_range.is_none() {
            let first_range = OcrEngine::ALL
                .iter()
                .filter_map(|engine| self.status(*engine))
                .find_map(|status| status.parsed_page_range());
            if let Some(range) = first_range {
                info!("📄 页码范围: {}", range);
                self.page_range = Some(range);
                self.current_page = range.first;
            }
        }

        let api = self.api.clone();
        for (engine, request_id) in self.token.pairs() {
            let status = self.status(engine);
            if let Err(e) = self
                .results
                .refresh(api.as_ref(), engine, request_id, status.as_ref())
                .await
            {
                // 结果拉取失败只记录，下次同步再试
                warn!("[{} #{}] 结果获取失败: {}", engine, request_id, e);
            }
        }
    }

    /// 反复同步直到条件满足或轮数用尽
    ///
    /// 每轮最多等待 `round_timeout`；返回条件最终是否满足
    pub async fn sync_until<F>(&mut self, max_rounds: u32, round_timeout: Duration, done: F) -> bool
    where
        F: Fn(&Self) -> bool,
    {
        for round in 1..=max_rounds {
            self.sync().await;
            if done(&*self) {
                return true;
            }
            debug!("第 {}/{} 轮条件未满足", round, max_rounds);
            if let Ok(false) = tokio::time::timeout(round_timeout, self.wait_for_update()).await {
                break;
            }
        }
        self.sync().await;
        done(&*self)
    }

    /// 等待某个引擎在指定页的任务出现，然后定位到该页
    ///
    /// 页码范围一旦确定且不包含该页就不再等待，直接报错
    pub async fn wait_for_page(
        &mut self,
        engine: OcrEngine,
        page: u32,
        max_rounds: u32,
        round_timeout: Duration,
    ) -> AppResult<()> {
        let settled = self
            .sync_until(max_rounds, round_timeout, |s| {
                s.job_id_for(engine, page).is_some() || s.page_in_range(page) == Some(false)
            })
            .await;
        if !settled {
            warn!("⚠️ {} 第 {} 页的任务尚未出现", engine.label(), page);
        }
        self.select_page(page)
    }

    /// 当前页每个引擎的文本
    pub fn texts(&self) -> [(OcrEngine, &str); 4] {
        self.results.texts_for_page(self.current_page)
    }

    pub fn text(&self, engine: OcrEngine) -> &str {
        self.results.text_for_page(engine, self.current_page)
    }

    /// 指定引擎在某一页的任务 ID
    pub fn job_id_for(&self, engine: OcrEngine, page: u32) -> Option<u64> {
        self.status(engine)
            .and_then(|status| status.job_for_page(page).map(|job| job.id))
    }

    /// 当前页每个引擎的任务 ID
    pub fn current_job_ids(&self) -> [(OcrEngine, Option<u64>); 4] {
        OcrEngine::ALL.map(|engine| (engine, self.job_id_for(engine, self.current_page)))
    }

    fn current_job(&self, engine: OcrEngine) -> Result<u64, EvaluationError> {
        self.job_id_for(engine, self.current_page)
            .ok_or(EvaluationError::MissingJob {
                engine,
                page: self.current_page,
            })
    }

    pub fn form(&self) -> &EvaluationForm {
        &self.form
    }

    /// 当前页某个引擎的评估是否已提交
    pub fn is_submitted(&self, engine: OcrEngine) -> bool {
        self.job_id_for(engine, self.current_page)
            .map_or(false, |job_id| self.form.is_submitted(engine, job_id))
    }

    /// 修改当前页某个引擎的评估字段
    pub fn update_evaluation(
        &mut self,
        engine: OcrEngine,
        update: FieldUpdate,
    ) -> Result<(), EvaluationError> {
        let job_id = self.current_job(engine)?;
        self.form.update(engine, job_id, update)
    }

    /// 把一整份草稿合并到当前页某个引擎的评估
    pub fn fill_evaluation(
        &mut self,
        engine: OcrEngine,
        draft: EvaluationDraft,
    ) -> Result<(), EvaluationError> {
        let job_id = self.current_job(engine)?;
        self.form.fill(engine, job_id, draft)
    }

    /// 提交当前页某个引擎的评估
    pub async fn submit_evaluation(&mut self, engine: OcrEngine) -> AppResult<()> {
        let job_id = self.current_job(engine)?;
        self.form.submit(self.api.as_ref(), engine, job_id).await
    }

    /// 根据后端已有的评估记录标记已提交的任务
    pub fn mark_existing(&mut self, evaluations: &[EvaluationDraft]) {
        for evaluation in evaluations.iter().filter(|e| e.evaluation_submitted) {
            let Some(job_id) = evaluation.ocr_job_id else {
                continue;
            };
            let owner = OcrEngine::ALL.into_iter().find(|engine| {
                self.status(*engine)
                    .map_or(false, |s| s.jobs.iter().any(|job| job.id == job_id))
            });
            if let Some(engine) = owner {
                debug!("任务 {} ({}) 已有评估记录", job_id, engine);
                self.form.mark_submitted(engine, job_id);
            }
        }
    }

    /// 全部任务 ID（用于查询已有评估）
    pub fn all_job_ids(&self) -> Vec<u64> {
        OcrEngine::ALL
            .iter()
            .filter_map(|engine| self.status(*engine))
            .flat_map(|status| status.jobs.into_iter().map(|job| job.id))
            .collect()
    }

    /// 结束会话，停止全部轮询
    pub fn close(self) {
        for poller in &self.pollers {
            poller.stop();
        }
        info!("评估会话已关闭: {}", self.token);
    }
}
