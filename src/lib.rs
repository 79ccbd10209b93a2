//! # OCR Eval Dashboard
//!
//! 对比四个 OCR 引擎（tesseract / marker / olmocr / smoldocling）并人工评估结果的客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责 HTTP 通信
//! - `OcrApi` - OCR 任务 API 的抽象，`OcrApiClient` 为 reqwest 实现
//! - `StoreClient` - 存储后端（文档、任务、评估记录的只读查询）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `SubmissionService` - 同一页码范围并发提交到四个引擎
//! - `StatusPoller` - 单个引擎的定时状态轮询
//! - `ResultMerger` - 完成后拉取结果，按页查找文本
//! - `EvaluationForm` - 评估草稿、校验与提交
//! - `job_grouping` - 任务按请求分组与筛选
//! - `document_service` - 文档导入
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次评估"的完整流程
//! - `RequestToken` - 四个请求 ID 的编码
//! - `EvalSession` - 轮询 → 页码范围 → 结果 → 评估
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，管理资源和命令分发
//! - `orchestrator/command` - 命令行解析
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{OcrApi, OcrApiClient, StoreClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{OcrEngine, PageRange};
pub use orchestrator::{App, Cli, Command};
pub use workflow::{EvalSession, RequestToken};
