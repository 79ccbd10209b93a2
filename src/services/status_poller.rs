//! 状态轮询服务 - 业务能力层
//!
//! 每个 (引擎, 请求 ID) 一个独立的轮询任务，最新状态通过 watch 通道发布。
//! 轮询器自己不会因为终态停止，由使用方决定何时 stop（或直接 drop）。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::clients::OcrApi;
use crate::models::{OcrEngine, OcrStatusResponse};

/// 单个引擎的状态轮询器
pub struct StatusPoller {
    engine: OcrEngine,
    request_id: u64,
    latest: watch::Receiver<Option<OcrStatusResponse>>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// 启动轮询，第一次请求立即发出
    pub fn spawn(
        api: Arc<dyn OcrApi>,
        engine: OcrEngine,
        request_id: u64,
        interval: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // 同一轮询器内请求是串行的，旧响应不会覆盖新响应
                match api.get_status(engine, request_id).await {
                    Ok(status) => {
                        debug!(
                            "[{} #{}] 状态 {} ({} 页完成)",
                            engine,
                            request_id,
                            status.status.as_str(),
                            status.completed_pages
                        );
                        if tx.send(Some(status)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        // 失败时保留上一次的状态
                        warn!("[{} #{}] 状态查询失败: {}", engine, request_id, e);
                    }
                }
            }
        });

        Self {
            engine,
            request_id,
            latest: rx,
            handle,
        }
    }

    pub fn engine(&self) -> OcrEngine {
        self.engine
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// 最近一次成功拿到的状态
    pub fn latest(&self) -> Option<OcrStatusResponse> {
        self.latest.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<Option<OcrStatusResponse>> {
        self.latest.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// 停止轮询
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::FakeOcrApi;
    use crate::models::{PageRange, RequestStatus};
    use std::sync::atomic::Ordering;

    #[tokio::test(start_paused = true)]
    async fn publishes_latest_status_every_interval() {
        let api = Arc::new(FakeOcrApi::new());
        api.set_status(OcrEngine::Marker, 7, RequestStatus::Processing, PageRange::new(1, 2));

        let poller = StatusPoller::spawn(api.clone(), OcrEngine::Marker, 7, Duration::from_secs(3));
        let mut rx = poller.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(
            poller.latest().map(|s| s.status),
            Some(RequestStatus::Processing)
        );

        api.set_status(OcrEngine::Marker, 7, RequestStatus::Completed, PageRange::new(1, 2));
        rx.changed().await.unwrap();
        assert_eq!(
            poller.latest().map(|s| s.status),
            Some(RequestStatus::Completed)
        );
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_value() {
        let api = Arc::new(FakeOcrApi::new());
        api.set_status(OcrEngine::Tesseract, 1, RequestStatus::Processing, PageRange::new(1, 1));

        let poller = StatusPoller::spawn(api.clone(), OcrEngine::Tesseract, 1, Duration::from_secs(3));
        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();

        api.fail_status.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(api.status_calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(
            poller.latest().map(|s| s.status),
            Some(RequestStatus::Processing)
        );
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_polling() {
        let api = Arc::new(FakeOcrApi::new());
        api.set_status(OcrEngine::Olmocr, 3, RequestStatus::Completed, PageRange::new(1, 1));

        let poller = StatusPoller::spawn(api.clone(), OcrEngine::Olmocr, 3, Duration::from_secs(3));
        let mut rx = poller.subscribe();
        rx.changed().await.unwrap();

        poller.stop();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let calls = api.status_calls.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.status_calls.load(Ordering::SeqCst), calls);
        assert!(!poller.is_running());
    }
}
