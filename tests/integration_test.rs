//! 整体流程测试：提交 → 轮询 → 结果 → 评估
//!
//! 使用内存中的任务 API，不访问网络

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ocr_eval_dashboard::error::{AppError, AppResult, EvaluationError, SubmissionError};
use ocr_eval_dashboard::models::{
    load_evaluation_draft, EngineOptions, EvaluationSubmission, FieldUpdate, JobStatus, OcrEngine,
    OcrJob, OcrResultItem, OcrStartResponse, OcrStatusResponse, PageRange,
    ProcessDocumentRequest, RequestStatus,
};
use ocr_eval_dashboard::services::{group_jobs, JobFilter, SubmissionService};
use ocr_eval_dashboard::workflow::{EvalSession, RequestToken};
use ocr_eval_dashboard::OcrApi;

const INTERVAL: Duration = Duration::from_secs(3);

/// 启动后立即处理完成的任务后端
#[derive(Default)]
struct InstantBackend {
    next_id: AtomicU64,
    failing: Option<OcrEngine>,
    requests: Mutex<HashMap<u64, (OcrEngine, String, PageRange)>>,
    evaluations: Mutex<Vec<EvaluationSubmission>>,
}

impl InstantBackend {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(40),
            ..Default::default()
        }
    }

    fn failing(engine: OcrEngine) -> Self {
        Self {
            failing: Some(engine),
            ..Self::new()
        }
    }

    fn job_id(request_id: u64, page: u32) -> u64 {
        request_id * 1000 + page as u64
    }

    fn jobs(&self) -> Vec<OcrJob> {
        let requests = self.requests.lock().unwrap();
        let mut ids: Vec<&u64> = requests.keys().collect();
        ids.sort();
        ids.into_iter()
            .flat_map(|id| {
                let (engine, range) = (requests[id].0, requests[id].2);
                range.pages().map(move |page| OcrJob {
                    id: Self::job_id(*id, page),
                    request_id: *id,
                    document_id: "doc-7".to_string(),
                    page_number: page,
                    ocr_output: format!("{} text for page {}", engine, page),
                    ocr_model: engine,
                    ocr_config: serde_json::Value::Null,
                    status: JobStatus::Completed,
                    created_at: "2025-03-04T05:06:07Z".to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl OcrApi for InstantBackend {
    async fn start_ocr(
        &self,
        engine: OcrEngine,
        barcode: &str,
        range: PageRange,
        _options: &EngineOptions,
    ) -> AppResult<OcrStartResponse> {
        if self.failing == Some(engine) {
            return Err(AppError::validation(format!("{} is offline", engine)));
        }
        let request_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .insert(request_id, (engine, barcode.to_string(), range));
        Ok(OcrStartResponse {
            message: "accepted".to_string(),
            request_id,
            status: RequestStatus::Processing,
            document_id: "doc-7".to_string(),
            page_range: range.to_string(),
        })
    }

    async fn get_status(&self, engine: OcrEngine, request_id: u64) -> AppResult<OcrStatusResponse> {
        let jobs: Vec<OcrJob> = self
            .jobs()
            .into_iter()
            .filter(|job| job.request_id == request_id && job.ocr_model == engine)
            .collect();
        let (_, _, range) = self
            .requests
            .lock()
            .unwrap()
            .get(&request_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("request", request_id))?;
        Ok(OcrStatusResponse {
            request_id,
            status: RequestStatus::Completed,
            document_id: "doc-7".to_string(),
            page_range: range.to_string(),
            completed_pages: jobs.len() as u32,
            jobs,
        })
    }

    async fn get_result(&self, engine: OcrEngine, request_id: u64) -> AppResult<Vec<OcrResultItem>> {
        Ok(self
            .jobs()
            .into_iter()
            .filter(|job| job.request_id == request_id && job.ocr_model == engine)
            .map(|job| OcrResultItem {
                text: job.ocr_output,
                page_number: job.page_number,
            })
            .collect())
    }

    async fn submit_evaluation(&self, submission: &EvaluationSubmission) -> AppResult<()> {
        self.evaluations.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn process_document(&self, _request: &ProcessDocumentRequest) -> AppResult<()> {
        Ok(())
    }
}

const DRAFT: &str = r#"
format_quality = 4
format_quality_comment = "Headings kept"
output_vs_ground_truth = 3
output_vs_ground_truth_comment = "Some typos"
table_parsing_capabilities = 2
table_parsing_capabilities_comment = "Columns merged"
hallucination = 5
hallucination_comment = "None seen"
evaluators_overall_comment = "Usable"
evaluation_submitted = true
"#;

#[tokio::test(start_paused = true)]
async fn submit_watch_and_evaluate_one_page() {
    let backend = Arc::new(InstantBackend::new());
    let service = SubmissionService::new(EngineOptions::default());

    let ids = service
        .submit_all(backend.as_ref(), "12345", PageRange::new(1, 5))
        .await
        .unwrap();
    let token = RequestToken::new(ids);
    let encoded = token.encode();
    assert_eq!(encoded.split(',').count(), 4);
    assert_eq!(encoded.parse::<RequestToken>().unwrap(), token);
    for (_, barcode, range) in backend.requests.lock().unwrap().values() {
        assert_eq!(barcode, "12345");
        assert_eq!(*range, PageRange::new(1, 5));
    }

    let mut session = EvalSession::open(backend.clone(), "doc-7", token, INTERVAL);
    assert!(session.sync_until(10, INTERVAL * 2, EvalSession::is_all_completed).await);
    assert_eq!(session.page_range(), Some(PageRange::new(1, 5)));

    assert_eq!(session.set_page(3), 3);
    assert_eq!(session.text(OcrEngine::Marker), "marker text for page 3");
    for (engine, text) in session.texts() {
        assert_eq!(text, format!("{} text for page 3", engine));
    }

    // 草稿文件里的 evaluation_submitted 会被忽略
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DRAFT.as_bytes()).unwrap();
    let draft = load_evaluation_draft(file.path()).await.unwrap();
    assert!(!draft.evaluation_submitted);

    session.fill_evaluation(OcrEngine::Tesseract, draft).unwrap();
    session.submit_evaluation(OcrEngine::Tesseract).await.unwrap();

    let sent = backend.evaluations.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].ocr_job_id,
        InstantBackend::job_id(token.id_for(OcrEngine::Tesseract), 3)
    );
    assert_eq!(sent[0].format_quality, 4);
    assert!(sent[0].evaluation_submitted);

    assert!(session.is_submitted(OcrEngine::Tesseract));
    assert!(!session.is_submitted(OcrEngine::Marker));
    assert!(matches!(
        session.update_evaluation(OcrEngine::Tesseract, FieldUpdate::Hallucination(1)),
        Err(EvaluationError::AlreadySubmitted { .. })
    ));

    // 其他页的同一引擎仍可评估
    session.set_page(4);
    assert!(!session.is_submitted(OcrEngine::Tesseract));
    session.close();
}

#[tokio::test(start_paused = true)]
async fn evaluation_for_a_page_outside_the_request_is_refused() {
    let backend = Arc::new(InstantBackend::new());
    let service = SubmissionService::new(EngineOptions::default());
    let ids = service
        .submit_all(backend.as_ref(), "12345", PageRange::new(1, 5))
        .await
        .unwrap();
    let token = RequestToken::new(ids);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DRAFT.as_bytes()).unwrap();
    let draft = load_evaluation_draft(file.path()).await.unwrap();

    let mut session = EvalSession::open(backend.clone(), "doc-7", token, INTERVAL);
    let err = session
        .wait_for_page(OcrEngine::Marker, 9, 600, INTERVAL * 2)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("9"));
    assert!(backend.evaluations.lock().unwrap().is_empty());

    session
        .wait_for_page(OcrEngine::Marker, 5, 600, INTERVAL * 2)
        .await
        .unwrap();
    session.fill_evaluation(OcrEngine::Marker, draft).unwrap();
    session.submit_evaluation(OcrEngine::Marker).await.unwrap();

    let sent = backend.evaluations.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].ocr_job_id,
        InstantBackend::job_id(token.id_for(OcrEngine::Marker), 5)
    );
    session.close();
}

#[tokio::test]
async fn one_failing_engine_fails_the_whole_submission() {
    let backend = InstantBackend::failing(OcrEngine::Olmocr);
    let service = SubmissionService::new(EngineOptions::default());

    let err = service
        .submit_all(&backend, "12345", PageRange::new(2, 2))
        .await
        .unwrap_err();

    match err {
        AppError::Submission(SubmissionError::EnginesFailed { failures, orphaned }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, OcrEngine::Olmocr);
            assert_eq!(orphaned.len(), 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    // 已成功的三个请求留在后端
    assert_eq!(backend.requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn submitted_jobs_group_by_request() {
    let backend = InstantBackend::new();
    let service = SubmissionService::new(EngineOptions::default());
    service
        .submit_all(&backend, "12345", PageRange::new(1, 2))
        .await
        .unwrap();

    let groups = group_jobs(&backend.jobs());
    assert_eq!(groups.len(), 4);
    assert!(groups.iter().all(|g| g.status() == JobStatus::Completed));
    assert!(groups.iter().all(|g| g.page_range().label() == "Pages 1-2"));

    let filter = JobFilter {
        engine: Some(OcrEngine::Smoldocling),
        status: Some(JobStatus::Completed),
        ..Default::default()
    };
    let shown = filter.apply(&groups, &HashMap::new());
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].engines(), vec![OcrEngine::Smoldocling]);
}
