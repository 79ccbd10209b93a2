//! 请求令牌
//!
//! 四个请求 ID 按固定引擎顺序用逗号拼接，例如 `"12,13,14,15"`，
//! 用来从提交跳转到评估。

use std::fmt::Display;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::OcrEngine;

/// 一次四引擎提交得到的请求 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    ids: [u64; 4],
}

impl RequestToken {
    pub fn new(ids: [u64; 4]) -> Self {
        Self { ids }
    }

    /// 指定引擎的请求 ID
    pub fn id_for(&self, engine: OcrEngine) -> u64 {
        self.ids[engine.index()]
    }

    /// 由请求 ID 反查引擎
    pub fn engine_for(&self, request_id: u64) -> Option<OcrEngine> {
        OcrEngine::ALL
            .into_iter()
            .find(|engine| self.id_for(*engine) == request_id)
    }

    /// (引擎, 请求 ID) 列表
    pub fn pairs(&self) -> [(OcrEngine, u64); 4] {
        OcrEngine::ALL.map(|engine| (engine, self.id_for(engine)))
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

impl FromStr for RequestToken {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != OcrEngine::ALL.len() {
            return Err(AppError::validation(format!(
                "请求令牌需要 {} 个 ID: '{}'",
                OcrEngine::ALL.len(),
                s
            )));
        }

        let mut ids = [0u64; 4];
        for (slot, part) in ids.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| AppError::validation(format!("无法解析请求 ID: '{}'", part)))?;
        }
        Ok(Self { ids })
    }
}
