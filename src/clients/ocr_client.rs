/// OCR 任务 API 客户端
///
/// 封装所有与任务处理 API 相关的调用逻辑
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{
    EngineOptions, EvaluationSubmission, OcrEngine, OcrResultItem, OcrStartResponse,
    OcrStatusResponse, PageRange, ProcessDocumentRequest, ValidationErrorBody,
};

/// 任务 API 的能力
///
/// 提交、轮询、结果合并、评估都只依赖这个 trait。
#[async_trait]
pub trait OcrApi: Send + Sync {
    /// `GET /{engine}`：为一个页码范围启动 OCR
    async fn start_ocr(
        &self,
        engine: OcrEngine,
        barcode: &str,
        range: PageRange,
        options: &EngineOptions,
    ) -> AppResult<OcrStartResponse>;

    /// `GET /{engine}/status/{request_id}`
    async fn get_status(&self, engine: OcrEngine, request_id: u64)
        -> AppResult<OcrStatusResponse>;

    /// `GET /{engine}/result/{request_id}`
    async fn get_result(&self, engine: OcrEngine, request_id: u64)
        -> AppResult<Vec<OcrResultItem>>;

    /// `POST /ocr_evaluation`
    async fn submit_evaluation(&self, submission: &EvaluationSubmission) -> AppResult<()>;

    /// `POST /admin/process-document`
    async fn process_document(&self, request: &ProcessDocumentRequest) -> AppResult<()>;
}

/// 基于 reqwest 的任务 API 客户端
#[derive(Clone)]
pub struct OcrApiClient {
    client: Client,
    base_url: String,
}

impl OcrApiClient {
    /// 创建新的任务 API 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::api_request_failed("client builder", e))?;

        Ok(Self {
            client,
            base_url: config.ocr_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 检查状态码并解析 JSON 响应体
    async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> AppResult<T> {
        let response = Self::ensure_success(endpoint, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source: e,
            })
        })
    }

    async fn ensure_success(endpoint: &str, response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: Some(body).filter(|b| !b.is_empty()),
        }))
    }
}

#[async_trait]
impl OcrApi for OcrApiClient {
    async fn start_ocr(
        &self,
        engine: OcrEngine,
        barcode: &str,
        range: PageRange,
        options: &EngineOptions,
    ) -> AppResult<OcrStartResponse> {
        let endpoint = engine.name();
        let mut query: Vec<(&str, String)> = vec![
            ("barcode", barcode.to_string()),
            ("first_page", range.first.to_string()),
            ("last_page", range.last.to_string()),
        ];
        query.extend(options.query_params(engine));

        debug!("启动 {} OCR: {:?}", engine, query);

        let response = self
            .client
            .get(self.url(endpoint))
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        Self::read_json(endpoint, response).await
    }

    async fn get_status(
        &self,
        engine: OcrEngine,
        request_id: u64,
    ) -> AppResult<OcrStatusResponse> {
        let endpoint = format!("{}/status/{}", engine.name(), request_id);
        let response = self
            .client
            .get(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        Self::read_json(&endpoint, response).await
    }

    async fn get_result(
        &self,
        engine: OcrEngine,
        request_id: u64,
    ) -> AppResult<Vec<OcrResultItem>> {
        let endpoint = format!("{}/result/{}", engine.name(), request_id);
        let response = self
            .client
            .get(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        Self::read_json(&endpoint, response).await
    }

    async fn submit_evaluation(&self, submission: &EvaluationSubmission) -> AppResult<()> {
        let endpoint = "ocr_evaluation";
        debug!("提交评估 Payload: job {}", submission.ocr_job_id);

        let response = self
            .client
            .post(self.url(endpoint))
            .json(submission)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        Self::ensure_success(endpoint, response).await?;
        Ok(())
    }

    async fn process_document(&self, request: &ProcessDocumentRequest) -> AppResult<()> {
        let endpoint = "admin/process-document";
        let response = self
            .client
            .post(self.url(endpoint))
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // 后端的校验错误放在 detail 列表里，只取第一条
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ValidationErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.first_message().map(str::to_string))
            .unwrap_or_else(|| "文档处理失败".to_string());

        Err(AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: Some(message),
        }))
    }
}
