//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：写日志文件头、加载引擎参数、创建客户端
//! 2. **命令分发**：每条命令委托给 services / workflow 完成
//! 3. **资源管理**：唯一持有 OCR 客户端和存储客户端
//! 4. **结果输出**：打印列表、文本和统计信息

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::{OcrApi, OcrApiClient, StoreClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{load_engine_options, load_evaluation_draft, EngineOptions, OcrEngine, PageRange};
use crate::orchestrator::command::Command;
use crate::services::{
    build_ingest_request, group_jobs, index_documents, ingest_document, JobFilter,
    SubmissionService,
};
use crate::utils::logging::{
    self, format_timestamp, log_submission, print_jobs_summary, print_session_stats,
    truncate_text,
};
use crate::workflow::{EvalSession, RequestToken};

/// 文本预览的最大长度
const PREVIEW_CHARS: usize = 2000;

/// 应用主结构
pub struct App {
    config: Config,
    api: Arc<dyn OcrApi>,
    store: StoreClient,
    submission: SubmissionService,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::init_log_file(&config.output_log_file)?;

        let options = match &config.engine_options_file {
            Some(path) => {
                info!("📁 加载引擎参数: {}", path);
                load_engine_options(Path::new(path)).await?
            }
            None => EngineOptions::default(),
        };

        let api: Arc<dyn OcrApi> = Arc::new(OcrApiClient::new(&config)?);
        let store = StoreClient::new(&config)?;

        Ok(Self {
            config,
            api,
            store,
            submission: SubmissionService::new(options),
        })
    }

    /// 执行一条命令
    pub async fn run(&self, command: Command) -> AppResult<()> {
        logging::log_startup(&self.config, command.name());

        match &command {
            Command::Documents => self.list_documents().await,
            Command::Document { document_id } => self.show_document(document_id).await,
            Command::Submit {
                document_id,
                first,
                last,
            } => self
                .submit(document_id, PageRange::new(*first, *last))
                .await
                .map(|_| ()),
            Command::Watch {
                document_id,
                token,
                page,
            } => self.watch(document_id, *token, *page).await,
            Command::Evaluate {
                document_id,
                token,
                engine,
                page,
                draft,
            } => self.evaluate(document_id, *token, *engine, *page, draft).await,
            Command::Jobs { .. } => {
                let filter = command.job_filter().unwrap_or_default();
                self.list_jobs(&filter).await
            }
            Command::Ingest {
                title,
                ia_link,
                barcode,
                max_pages,
            } => {
                let request = build_ingest_request(title, ia_link, barcode, *max_pages)?;
                ingest_document(self.api.as_ref(), &request).await
            }
        }
    }

    async fn list_documents(&self) -> AppResult<()> {
        let documents = self.store.list_documents().await?;
        info!("✓ 共 {} 个文档", documents.len());

        for doc in &documents {
            let done = if doc.ocr_evaluation_done { "✅" } else { "  " };
            println!(
                "{} {}  {}  barcode={}  {}",
                done,
                doc.id,
                doc.title,
                doc.barcode,
                format_timestamp(&doc.created_at)
            );
        }
        Ok(())
    }

    async fn show_document(&self, document_id: &str) -> AppResult<()> {
        let doc = self.store.get_document(document_id).await?;
        println!("{} (barcode {})", doc.title, doc.barcode);
        println!("来源: {}", doc.ia_link);
        println!("首页图片: {}", self.store.page_image_url(doc.barcode, 1));

        for row in self.store.list_document_processing(document_id).await? {
            let error = row.error_message.as_deref().unwrap_or("");
            println!(
                "导入进度: {} {} {} {}",
                row.status,
                row.progress(),
                format_timestamp(&row.updated_at),
                error
            );
        }

        for request in self.store.list_ocr_requests(document_id).await? {
            println!(
                "请求 #{}  {}  页码 {}  {}  {}",
                request.id,
                request.ocr_model.label(),
                request.page_range,
                request.status.as_str(),
                format_timestamp(&request.created_at)
            );
        }
        Ok(())
    }

    /// 提交到四个引擎，返回请求令牌
    pub async fn submit(&self, document_id: &str, range: PageRange) -> AppResult<RequestToken> {
        let doc = self.store.get_document(document_id).await?;
        let ids = self
            .submission
            .submit_all(self.api.as_ref(), &doc.barcode.to_string(), range)
            .await?;

        let token = RequestToken::new(ids);
        log_submission(&token.encode(), document_id);
        println!("{}", token);
        Ok(token)
    }

    async fn watch(&self, document_id: &str, token: RequestToken, page: Option<u32>) -> AppResult<()> {
        let doc = self.store.get_document(document_id).await?;
        let mut session = self.open_session(document_id, token);

        let finished = session
            .sync_until(
                self.config.max_poll_rounds,
                self.config.poll_interval() * 2,
                EvalSession::is_all_terminal,
            )
            .await;
        if !finished {
            warn!("⚠️ 达到最大轮询次数 {}，部分引擎仍未结束", self.config.max_poll_rounds);
        }

        if let Some(page) = page {
            let shown = session.set_page(page);
            if shown != page {
                warn!("⚠️ 第 {} 页不在页码范围内，显示第 {} 页", page, shown);
            }
        }
        let current = session.current_page();

        println!("{} - 第 {} 页", doc.title, current);
        println!("图片: {}", self.store.page_image_url(doc.barcode, current));
        for (engine, status) in session.statuses() {
            let state = status
                .map(|s| s.status.as_str())
                .unwrap_or("unknown");
            println!("\n===== {} ({}) =====", engine.label(), state);
            println!("{}", truncate_text(session.text(engine), PREVIEW_CHARS));
        }

        print_session_stats(session.completed_engines(), 0, &self.config.output_log_file);
        session.close();
        Ok(())
    }

    async fn evaluate(
        &self,
        document_id: &str,
        token: RequestToken,
        engine: OcrEngine,
        page: u32,
        draft_path: &Path,
    ) -> AppResult<()> {
        let draft = load_evaluation_draft(draft_path).await?;
        self.store.get_document(document_id).await?;

        let mut session = self.open_session(document_id, token);
        session
            .wait_for_page(
                engine,
                page,
                self.config.max_poll_rounds,
                self.config.poll_interval() * 2,
            )
            .await?;

        let existing = self.store.list_evaluations(&session.all_job_ids()).await?;
        session.mark_existing(&existing);

        let outcome = match session.fill_evaluation(engine, draft) {
            Ok(()) => session.submit_evaluation(engine).await,
            Err(e) => Err(e.into()),
        };
        let submitted = usize::from(outcome.is_ok());
        print_session_stats(
            session.completed_engines(),
            submitted,
            &self.config.output_log_file,
        );
        session.close();
        outcome
    }

    async fn list_jobs(&self, filter: &JobFilter) -> AppResult<()> {
        let (jobs, documents) =
            tokio::try_join!(self.store.list_ocr_jobs(), self.store.list_documents())?;
        let groups = group_jobs(&jobs);
        let documents = index_documents(&documents);

        let shown = filter.apply(&groups, &documents);
        for group in &shown {
            let title = documents
                .get(group.document_id())
                .map(|d| d.title.as_str())
                .unwrap_or("(未知文档)");
            let engines = group
                .engines()
                .iter()
                .map(|e| e.label())
                .collect::<Vec<_>>()
                .join("/");
            println!(
                "#{}  {}  {}  {}  {}  {}",
                group.request_id(),
                title,
                group.status(),
                engines,
                group.page_range().label(),
                format_timestamp(group.created_at())
            );
        }

        print_jobs_summary(shown.len(), groups.len());
        Ok(())
    }

    fn open_session(&self, document_id: &str, token: RequestToken) -> EvalSession {
        EvalSession::open(
            self.api.clone(),
            document_id,
            token,
            self.config.poll_interval(),
        )
    }
}
