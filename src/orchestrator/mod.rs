//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责命令分发和资源管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `command` - 命令行解析
//! - clap 把参数解析为 [`Cli`] / [`Command`]，参数错误在发出任何请求前报告
//!
//! ### `app` - 应用主结构
//! - 管理应用生命周期（初始化、运行）
//! - 持有 OCR 客户端、存储客户端和提交服务
//! - 每条命令委托给 services 或 workflow::EvalSession
//!
//! ## 层次关系
//!
//! ```text
//! app (一条命令)
//!     ↓
//! workflow::EvalSession (一个文档 + 一组请求)
//!     ↓
//! services (能力层：提交 / 轮询 / 结果 / 评估 / 分组)
//!     ↓
//! clients (OcrApi / StoreClient)
//! ```

pub mod app;
pub mod command;

pub use app::App;
pub use command::{Cli, Command};
