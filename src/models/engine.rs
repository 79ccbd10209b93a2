use serde::{Deserialize, Serialize};

/// OCR 引擎枚举
///
/// 声明顺序就是提交与请求 ID 拼接的固定顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    Tesseract,
    Marker,
    Olmocr,
    Smoldocling,
}

impl OcrEngine {
    /// 固定顺序的全部引擎
    pub const ALL: [OcrEngine; 4] = [
        OcrEngine::Tesseract,
        OcrEngine::Marker,
        OcrEngine::Olmocr,
        OcrEngine::Smoldocling,
    ];

    /// API 路径中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            OcrEngine::Tesseract => "tesseract",
            OcrEngine::Marker => "marker",
            OcrEngine::Olmocr => "olmocr",
            OcrEngine::Smoldocling => "smoldocling",
        }
    }

    /// 用于提示信息的大写名称
    pub fn label(self) -> String {
        self.name().to_uppercase()
    }

    /// 在固定顺序中的位置
    pub fn index(self) -> usize {
        self as usize
    }

    /// 从字符串解析引擎（忽略大小写，接受常用简称）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Some(OcrEngine::Tesseract),
            "marker" => Some(OcrEngine::Marker),
            "olmocr" | "olm" => Some(OcrEngine::Olmocr),
            "smoldocling" | "smol" => Some(OcrEngine::Smoldocling),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
