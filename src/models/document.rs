use serde::{Deserialize, Serialize};

/// `documents` 表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ia_link: String,
    pub barcode: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub ocr_evaluation_done: bool,
}

/// `document_processing` 表中的一行（文档导入进度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProcessing {
    pub id: u64,
    pub document_id: String,
    /// 后端的自由文本状态，例如 `processing`、`completed`、`failed`
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub pages_processed: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl DocumentProcessing {
    /// 进度描述，例如 `3/10`
    pub fn progress(&self) -> String {
        match self.total_pages {
            Some(total) => format!("{}/{}", self.pages_processed, total),
            None => format!("{}/?", self.pages_processed),
        }
    }
}

/// `POST /admin/process-document` 的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDocumentRequest {
    pub title: String,
    pub ia_link: String,
    pub barcode: u64,
    pub max_pages: u32,
}

/// 后端校验失败时的错误体：`{"detail": [{"msg": "..."}]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationErrorBody {
    #[serde(default)]
    pub detail: Vec<ValidationErrorItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationErrorItem {
    #[serde(default)]
    pub msg: String,
}

impl ValidationErrorBody {
    /// 第一条校验信息
    pub fn first_message(&self) -> Option<&str> {
        self.detail
            .first()
            .map(|item| item.msg.as_str())
            .filter(|msg| !msg.is_empty())
    }
}
