//! 存储后端客户端
//!
//! 后端以 PostgREST 形式暴露表（`/rest/v1/{table}`），页面图片放在公开的对象存储中。

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, StoreError};
use crate::models::{Document, DocumentProcessing, EvaluationDraft, OcrJob, OcrRequest};

/// 存储后端客户端（只读）
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_bucket: String,
}

impl StoreClient {
    /// 创建新的存储客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::store_query_failed("client builder", e))?;

        Ok(Self {
            client,
            base_url: config.store_url.trim_end_matches('/').to_string(),
            api_key: config.store_api_key.clone(),
            image_bucket: config.image_bucket.clone(),
        })
    }

    /// 查询一张表
    ///
    /// `filters` 直接作为 PostgREST 查询参数，例如 `("id", "eq.42")`。
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend(filters.iter().cloned());

        debug!("查询 {}: {:?}", table, query);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::store_query_failed(table, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(StoreError::BadResponse {
                table: table.to_string(),
                status: status.as_u16(),
                body,
            }));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::store_query_failed(table, e))
    }

    /// 全部文档，按创建时间倒序
    pub async fn list_documents(&self) -> AppResult<Vec<Document>> {
        self.select("documents", &[("order", "created_at.desc".to_string())])
            .await
    }

    /// 单个文档，不存在时返回 NotFound
    pub async fn get_document(&self, id: &str) -> AppResult<Document> {
        let rows: Vec<Document> = self
            .select("documents", &[("id", format!("eq.{}", id))])
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("document", id))
    }

    /// 全部 OCR 任务，按创建时间倒序
    pub async fn list_ocr_jobs(&self) -> AppResult<Vec<OcrJob>> {
        self.select("ocr_jobs", &[("order", "created_at.desc".to_string())])
            .await
    }

    /// 一个文档的全部 OCR 请求
    pub async fn list_ocr_requests(&self, document_id: &str) -> AppResult<Vec<OcrRequest>> {
        self.select(
            "ocr_requests",
            &[
                ("document_id", format!("eq.{}", document_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    /// 一个文档的导入进度
    pub async fn list_document_processing(
        &self,
        document_id: &str,
    ) -> AppResult<Vec<DocumentProcessing>> {
        self.select(
            "document_processing",
            &[
                ("document_id", format!("eq.{}", document_id)),
                ("order", "updated_at.desc".to_string()),
            ],
        )
        .await
    }

    /// 指定任务已有的评估记录
    pub async fn list_evaluations(&self, job_ids: &[u64]) -> AppResult<Vec<EvaluationDraft>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = job_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.select("ocr_evaluation_metrics", &[("ocr_job_id", format!("in.({})", ids))])
            .await
    }

    /// 页面图片的公开地址：`{bucket}/{barcode}/{page}.png`
    pub fn page_image_url(&self, barcode: u64, page: u32) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}/{}.png",
            self.base_url, self.image_bucket, barcode, page
        )
    }
}
