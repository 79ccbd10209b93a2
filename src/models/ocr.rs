use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::OnceLock;

use crate::models::engine::OcrEngine;

/// 请求级别状态（由任务 API 维护）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Processing,
    Completed,
    Error,
}

impl RequestStatus {
    /// 是否已到终态
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Error => "error",
        }
    }
}

/// 单页任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    /// 从字符串解析状态（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /{engine}` 的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrStartResponse {
    #[serde(default)]
    pub message: String,
    pub request_id: u64,
    pub status: RequestStatus,
    pub document_id: String,
    #[serde(default)]
    pub page_range: String,
}

/// 单页 OCR 任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrJob {
    pub id: u64,
    pub request_id: u64,
    pub document_id: String,
    pub page_number: u32,
    #[serde(default)]
    pub ocr_output: String,
    pub ocr_model: OcrEngine,
    #[serde(default)]
    pub ocr_config: JsonValue,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: String,
}

/// `GET /{engine}/status/{request_id}` 的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrStatusResponse {
    pub request_id: u64,
    pub status: RequestStatus,
    pub document_id: String,
    #[serde(default)]
    pub page_range: String,
    #[serde(default)]
    pub completed_pages: u32,
    #[serde(default)]
    pub jobs: Vec<OcrJob>,
}

impl OcrStatusResponse {
    /// 指定页对应的任务
    pub fn job_for_page(&self, page: u32) -> Option<&OcrJob> {
        self.jobs.iter().find(|job| job.page_number == page)
    }

    /// 解析后的页码范围，空字符串或无法解析时为 None
    pub fn parsed_page_range(&self) -> Option<PageRange> {
        PageRange::parse(&self.page_range)
    }
}

/// `GET /{engine}/result/{request_id}` 列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResultItem {
    #[serde(default)]
    pub text: String,
    pub page_number: u32,
}

/// `ocr_requests` 表中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRequest {
    pub id: u64,
    pub document_id: String,
    pub ocr_model: OcrEngine,
    #[serde(default)]
    pub page_range: String,
    #[serde(default)]
    pub ocr_config: JsonValue,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: String,
}

/// 闭区间页码范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

fn page_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").expect("page range regex is valid")
    })
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// 解析 `"1-5"` 或 `"3"` 形式的页码范围
    pub fn parse(s: &str) -> Option<Self> {
        let caps = page_range_regex().captures(s)?;
        let first: u32 = caps.get(1)?.as_str().parse().ok()?;
        let last: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => first,
        };
        Some(Self { first, last })
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= self.first && page <= self.last
    }

    /// 把页码限制在范围内
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(self.first, self.last.max(self.first))
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }

    /// 列表展示用的标签
    pub fn label(&self) -> String {
        if self.first == self.last {
            format!("Page {}", self.first)
        } else {
            format!("Pages {}-{}", self.first, self.last)
        }
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}
