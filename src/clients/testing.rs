//! 单元测试用的内存任务 API

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::clients::OcrApi;
use crate::error::{AppError, AppResult};
use crate::models::{
    EngineOptions, EvaluationSubmission, JobStatus, OcrEngine, OcrJob, OcrResultItem,
    OcrStartResponse, OcrStatusResponse, PageRange, ProcessDocumentRequest, RequestStatus,
};

#[derive(Default)]
pub struct FakeOcrApi {
    next_id: AtomicU64,
    statuses: Mutex<HashMap<u64, OcrStatusResponse>>,
    results: Mutex<HashMap<u64, Vec<OcrResultItem>>>,
    pub evaluations: Mutex<Vec<EvaluationSubmission>>,
    pub status_calls: AtomicUsize,
    pub result_calls: AtomicUsize,
    pub fail_status: AtomicBool,
    pub fail_evaluation: AtomicBool,
}

impl FakeOcrApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    /// 为请求登记一个状态，任务按页码逐一生成
    pub fn set_status(
        &self,
        engine: OcrEngine,
        request_id: u64,
        status: RequestStatus,
        range: PageRange,
    ) {
        let job_status = match status {
            RequestStatus::Processing => JobStatus::Processing,
            RequestStatus::Completed => JobStatus::Completed,
            RequestStatus::Error => JobStatus::Error,
        };
        let jobs = range
            .pages()
            .map(|page| OcrJob {
                id: request_id * 100 + page as u64,
                request_id,
                document_id: "doc-1".to_string(),
                page_number: page,
                ocr_output: format!("{} page {}", engine, page),
                ocr_model: engine,
                ocr_config: serde_json::Value::Null,
                status: job_status,
                created_at: String::new(),
            })
            .collect();
        self.statuses.lock().unwrap().insert(
            request_id,
            OcrStatusResponse {
                request_id,
                status,
                document_id: "doc-1".to_string(),
                page_range: range.to_string(),
                completed_pages: 0,
                jobs,
            },
        );
    }

    pub fn set_results(&self, request_id: u64, items: Vec<OcrResultItem>) {
        self.results.lock().unwrap().insert(request_id, items);
    }
}

#[async_trait]
impl OcrApi for FakeOcrApi {
    async fn start_ocr(
        &self,
        _engine: OcrEngine,
        _barcode: &str,
        range: PageRange,
        _options: &EngineOptions,
    ) -> AppResult<OcrStartResponse> {
        Ok(OcrStartResponse {
            message: "accepted".to_string(),
            request_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            status: RequestStatus::Processing,
            document_id: "doc-1".to_string(),
            page_range: range.to_string(),
        })
    }

    async fn get_status(
        &self,
        _engine: OcrEngine,
        request_id: u64,
    ) -> AppResult<OcrStatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(AppError::validation("status unavailable"));
        }
        self.statuses
            .lock()
            .unwrap()
            .get(&request_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("request", request_id))
    }

    async fn get_result(
        &self,
        _engine: OcrEngine,
        request_id: u64,
    ) -> AppResult<Vec<OcrResultItem>> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(&request_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_evaluation(&self, submission: &EvaluationSubmission) -> AppResult<()> {
        if self.fail_evaluation.load(Ordering::SeqCst) {
            return Err(AppError::validation("backend rejected evaluation"));
        }
        self.evaluations.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn process_document(&self, _request: &ProcessDocumentRequest) -> AppResult<()> {
        Ok(())
    }
}
