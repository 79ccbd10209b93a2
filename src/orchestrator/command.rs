//! 命令行解析
//!
//! 参数错误由 clap 在发出任何请求前报告

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{JobStatus, OcrEngine};
use crate::services::JobFilter;
use crate::workflow::RequestToken;

#[derive(Debug, Parser)]
#[command(name = "ocr-eval")]
#[command(about = "OCR 引擎对比评估客户端")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

/// 一条命令
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// 列出全部文档
    Documents,
    /// 查看文档导入进度和 OCR 请求
    Document { document_id: String },
    /// 提交到四个引擎，输出请求令牌
    Submit {
        document_id: String,
        first: u32,
        last: u32,
    },
    /// 轮询直到全部引擎结束，输出该页文本
    Watch {
        document_id: String,
        #[arg(value_parser = parse_token)]
        token: RequestToken,
        page: Option<u32>,
    },
    /// 提交某个引擎在该页的评估
    Evaluate {
        document_id: String,
        #[arg(value_parser = parse_token)]
        token: RequestToken,
        #[arg(value_parser = parse_engine)]
        engine: OcrEngine,
        page: u32,
        draft: PathBuf,
    },
    /// 按请求分组列出任务
    Jobs {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<JobStatus>,
        #[arg(long, value_parser = parse_engine)]
        engine: Option<OcrEngine>,
    },
    /// 导入新文档
    Ingest {
        title: String,
        ia_link: String,
        barcode: String,
        max_pages: Option<u32>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Documents => "documents",
            Command::Document { .. } => "document",
            Command::Submit { .. } => "submit",
            Command::Watch { .. } => "watch",
            Command::Evaluate { .. } => "evaluate",
            Command::Jobs { .. } => "jobs",
            Command::Ingest { .. } => "ingest",
        }
    }

    /// `jobs` 的筛选条件
    pub fn job_filter(&self) -> Option<JobFilter> {
        match self {
            Command::Jobs {
                search,
                status,
                engine,
            } => Some(JobFilter {
                search: search.clone(),
                status: *status,
                engine: *engine,
            }),
            _ => None,
        }
    }
}

fn parse_token(value: &str) -> Result<RequestToken, String> {
    value.parse::<RequestToken>().map_err(|e| e.to_string())
}

fn parse_engine(value: &str) -> Result<OcrEngine, String> {
    OcrEngine::parse(value).ok_or_else(|| format!("未知的 OCR 引擎: '{}'", value))
}

fn parse_status(value: &str) -> Result<JobStatus, String> {
    JobStatus::parse(value).ok_or_else(|| format!("未知状态: '{}'", value))
}
