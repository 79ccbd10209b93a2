//! 各引擎的提交参数
//!
//! 默认值与提交表单保持一致，可以通过 TOML 文件覆盖。

use serde::{Deserialize, Serialize};

use crate::models::engine::OcrEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractOptions {
    pub dpi: u32,
    pub contrast: f32,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            dpi: 256,
            contrast: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerOptions {
    pub languages: String,
    pub force_ocr: bool,
    pub paginate_output: bool,
    pub output_format: String,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            languages: "eng".to_string(),
            force_ocr: true,
            paginate_output: true,
            output_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OlmOptions {
    pub temperature: f32,
    pub dpi: u32,
    pub max_new_tokens: u32,
    pub num_return_sequences: u32,
}

impl Default for OlmOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            dpi: 256,
            max_new_tokens: 1024,
            num_return_sequences: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmolDoclingOptions {
    pub max_pages: u32,
    pub target_image_dim: u32,
    pub max_new_tokens: u32,
}

impl Default for SmolDoclingOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            target_image_dim: 1280,
            max_new_tokens: 2048,
        }
    }
}

/// 四个引擎的参数集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub tesseract: TesseractOptions,
    pub marker: MarkerOptions,
    pub olmocr: OlmOptions,
    pub smoldocling: SmolDoclingOptions,
}

impl EngineOptions {
    /// 指定引擎的查询参数（不含 barcode 与页码）
    pub fn query_params(&self, engine: OcrEngine) -> Vec<(&'static str, String)> {
        match engine {
            OcrEngine::Tesseract => vec![
                ("dpi", self.tesseract.dpi.to_string()),
                ("contrast", self.tesseract.contrast.to_string()),
            ],
            OcrEngine::Marker => vec![
                ("languages", self.marker.languages.clone()),
                ("force_ocr", self.marker.force_ocr.to_string()),
                ("paginate_output", self.marker.paginate_output.to_string()),
                ("output_format", self.marker.output_format.clone()),
            ],
            OcrEngine::Olmocr => vec![
                ("temperature", self.olmocr.temperature.to_string()),
                ("dpi", self.olmocr.dpi.to_string()),
                ("max_new_tokens", self.olmocr.max_new_tokens.to_string()),
                (
                    "num_return_sequences",
                    self.olmocr.num_return_sequences.to_string(),
                ),
            ],
            OcrEngine::Smoldocling => vec![
                ("max_pages", self.smoldocling.max_pages.to_string()),
                (
                    "target_image_dim",
                    self.smoldocling.target_image_dim.to_string(),
                ),
                ("max_new_tokens", self.smoldocling.max_new_tokens.to_string()),
            ],
        }
    }
}
