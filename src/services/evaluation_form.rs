//! 评估表单状态 - 业务能力层
//!
//! 草稿按 引擎 → 任务 ID 两级保存。提交前校验九个必填字段，
//! 提交成功后在本地标记为已提交，之后拒绝任何修改。

use std::collections::HashMap;
use tracing::{info, warn};

use crate::clients::OcrApi;
use crate::error::{AppResult, EvaluationError};
use crate::models::{EvaluationDraft, EvaluationSubmission, OcrEngine, FieldUpdate};

/// 评估表单
#[derive(Debug, Default)]
pub struct EvaluationForm {
    drafts: HashMap<OcrEngine, HashMap<u64, EvaluationDraft>>,
}

impl EvaluationForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前草稿（未填写过则为 None）
    pub fn draft(&self, engine: OcrEngine, job_id: u64) -> Option<&EvaluationDraft> {
        self.drafts.get(&engine).and_then(|jobs| jobs.get(&job_id))
    }

    pub fn is_submitted(&self, engine: OcrEngine, job_id: u64) -> bool {
        self.draft(engine, job_id)
            .map_or(false, |draft| draft.evaluation_submitted)
    }

    fn slot(&mut self, engine: OcrEngine, job_id: u64) -> &mut EvaluationDraft {
        let draft = self
            .drafts
            .entry(engine)
            .or_default()
            .entry(job_id)
            .or_default();
        draft.ocr_job_id = Some(job_id);
        draft
    }

    /// 修改一个字段，其余字段保持不变
    pub fn update(
        &mut self,
        engine: OcrEngine,
        job_id: u64,
        update: FieldUpdate,
    ) -> Result<(), EvaluationError> {
        if self.is_submitted(engine, job_id) {
            return Err(EvaluationError::AlreadySubmitted { engine, job_id });
        }
        self.slot(engine, job_id).apply(update);
        Ok(())
    }

    /// 一次合并整份草稿（例如从 TOML 文件读入）
    pub fn fill(
        &mut self,
        engine: OcrEngine,
        job_id: u64,
        draft: EvaluationDraft,
    ) -> Result<(), EvaluationError> {
        if self.is_submitted(engine, job_id) {
            return Err(EvaluationError::AlreadySubmitted { engine, job_id });
        }
        self.slot(engine, job_id).merge_from(draft);
        Ok(())
    }

    /// 标记为已提交（后端已有记录时使用）
    pub fn mark_submitted(&mut self, engine: OcrEngine, job_id: u64) {
        self.slot(engine, job_id).evaluation_submitted = true;
    }

    /// 本地校验，通过时返回提交体
    pub fn validate(
        &self,
        engine: OcrEngine,
        job_id: u64,
    ) -> Result<EvaluationSubmission, EvaluationError> {
        if self.is_submitted(engine, job_id) {
            return Err(EvaluationError::AlreadySubmitted { engine, job_id });
        }

        let empty = EvaluationDraft::default();
        let draft = self.draft(engine, job_id).unwrap_or(&empty);

        let submission =
            EvaluationSubmission::from_draft(job_id, draft).map_err(|missing| {
                EvaluationError::MissingFields {
                    missing: missing.into_iter().map(|f| f.as_str()).collect(),
                }
            })?;

        for (field, value) in draft.ratings() {
            if let Some(v) = value {
                if !(1..=5).contains(&v) {
                    return Err(EvaluationError::InvalidRating {
                        field: field.as_str(),
                        value: v,
                    });
                }
            }
        }

        Ok(submission)
    }

    /// 提交评估
    ///
    /// 校验失败时不会发出请求；后端失败时不设置已提交标记，表单仍可修改。
    pub async fn submit(
        &mut self,
        api: &dyn OcrApi,
        engine: OcrEngine,
        job_id: u64,
    ) -> AppResult<()> {
        let submission = self.validate(engine, job_id)?;

        if let Err(e) = api.submit_evaluation(&submission).await {
            warn!("❌ {} 评估提交失败 (任务 {}): {}", engine.label(), job_id, e);
            return Err(EvaluationError::SubmitFailed {
                engine,
                source: Box::new(e),
            }
            .into());
        }

        self.mark_submitted(engine, job_id);
        info!("✓ {} 评估提交成功 (任务 {})", engine.label(), job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::testing::FakeOcrApi;
    use crate::error::AppError;
    use std::sync::atomic::Ordering;

    fn fill_all(form: &mut EvaluationForm, engine: OcrEngine, job_id: u64) {
        for update in [
            FieldUpdate::FormatQuality(4),
            FieldUpdate::FormatQualityComment("tidy".into()),
            FieldUpdate::OutputVsGroundTruth(3),
            FieldUpdate::OutputVsGroundTruthComment("minor typos".into()),
            FieldUpdate::TableParsingCapabilities(2),
            FieldUpdate::TableParsingCapabilitiesComment("rows merged".into()),
            FieldUpdate::Hallucination(5),
            FieldUpdate::HallucinationComment("none".into()),
            FieldUpdate::EvaluatorsOverallComment("good enough".into()),
        ] {
            form.update(engine, job_id, update).unwrap();
        }
    }

    #[test]
    fn drafts_are_isolated_per_engine_and_job() {
        let mut form = EvaluationForm::new();
        form.update(OcrEngine::Marker, 1, FieldUpdate::FormatQuality(2)).unwrap();
        form.update(OcrEngine::Marker, 2, FieldUpdate::FormatQuality(5)).unwrap();
        form.update(OcrEngine::Tesseract, 1, FieldUpdate::Hallucination(1)).unwrap();

        assert_eq!(form.draft(OcrEngine::Marker, 1).unwrap().format_quality, Some(2));
        assert_eq!(form.draft(OcrEngine::Marker, 2).unwrap().format_quality, Some(5));
        assert_eq!(form.draft(OcrEngine::Tesseract, 1).unwrap().format_quality, None);
        assert_eq!(form.draft(OcrEngine::Marker, 1).unwrap().ocr_job_id, Some(1));
    }

    #[tokio::test]
    async fn missing_fields_block_submission_without_network_call() {
        let api = FakeOcrApi::new();
        let mut form = EvaluationForm::new();
        form.update(OcrEngine::Olmocr, 9, FieldUpdate::FormatQuality(3)).unwrap();

        let err = form.submit(&api, OcrEngine::Olmocr, 9).await.unwrap_err();
        match err {
            AppError::Evaluation(EvaluationError::MissingFields { missing }) => {
                assert_eq!(missing.len(), 8);
                assert_eq!(missing[0], "format_quality_comment");
                assert!(!missing.contains(&"format_quality"));
                assert!(missing.contains(&"evaluators_overall_comment"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(api.evaluations.lock().unwrap().is_empty());
        assert!(!form.is_submitted(OcrEngine::Olmocr, 9));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let api = FakeOcrApi::new();
        let mut form = EvaluationForm::new();
        fill_all(&mut form, OcrEngine::Marker, 4);
        form.update(OcrEngine::Marker, 4, FieldUpdate::Hallucination(9)).unwrap();

        let err = form.submit(&api, OcrEngine::Marker, 4).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Evaluation(EvaluationError::InvalidRating { field: "hallucination", value: 9 })
        ));
        assert!(api.evaluations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_locks_the_draft() {
        let api = FakeOcrApi::new();
        let mut form = EvaluationForm::new();
        fill_all(&mut form, OcrEngine::Tesseract, 301);

        form.submit(&api, OcrEngine::Tesseract, 301).await.unwrap();

        assert!(form.is_submitted(OcrEngine::Tesseract, 301));
        let sent = api.evaluations.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].ocr_job_id, 301);
        assert!(sent[0].evaluation_submitted);

        let err = form
            .update(OcrEngine::Tesseract, 301, FieldUpdate::FormatQuality(1))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::AlreadySubmitted { .. }));
        assert!(form.submit(&api, OcrEngine::Tesseract, 301).await.is_err());
        assert_eq!(api.evaluations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn backend_failure_keeps_form_editable() {
        let api = FakeOcrApi::new();
        api.fail_evaluation.store(true, Ordering::SeqCst);
        let mut form = EvaluationForm::new();
        fill_all(&mut form, OcrEngine::Smoldocling, 12);

        let err = form.submit(&api, OcrEngine::Smoldocling, 12).await.unwrap_err();
        assert!(err.to_string().contains("SMOLDOCLING"));
        assert!(!form.is_submitted(OcrEngine::Smoldocling, 12));

        api.fail_evaluation.store(false, Ordering::SeqCst);
        form.update(OcrEngine::Smoldocling, 12, FieldUpdate::HallucinationComment("retry".into()))
            .unwrap();
        form.submit(&api, OcrEngine::Smoldocling, 12).await.unwrap();
        assert!(form.is_submitted(OcrEngine::Smoldocling, 12));
    }
}
