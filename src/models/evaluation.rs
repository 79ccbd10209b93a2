use serde::{Deserialize, Serialize};

/// 评估的九个必填字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationField {
    FormatQuality,
    FormatQualityComment,
    OutputVsGroundTruth,
    OutputVsGroundTruthComment,
    TableParsingCapabilities,
    TableParsingCapabilitiesComment,
    Hallucination,
    HallucinationComment,
    EvaluatorsOverallComment,
}

impl EvaluationField {
    /// 固定的必填字段列表
    pub const REQUIRED: [EvaluationField; 9] = [
        EvaluationField::FormatQuality,
        EvaluationField::FormatQualityComment,
        EvaluationField::OutputVsGroundTruth,
        EvaluationField::OutputVsGroundTruthComment,
        EvaluationField::TableParsingCapabilities,
        EvaluationField::TableParsingCapabilitiesComment,
        EvaluationField::Hallucination,
        EvaluationField::HallucinationComment,
        EvaluationField::EvaluatorsOverallComment,
    ];

    /// 后端字段名
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationField::FormatQuality => "format_quality",
            EvaluationField::FormatQualityComment => "format_quality_comment",
            EvaluationField::OutputVsGroundTruth => "output_vs_ground_truth",
            EvaluationField::OutputVsGroundTruthComment => "output_vs_ground_truth_comment",
            EvaluationField::TableParsingCapabilities => "table_parsing_capabilities",
            EvaluationField::TableParsingCapabilitiesComment => {
                "table_parsing_capabilities_comment"
            }
            EvaluationField::Hallucination => "hallucination",
            EvaluationField::HallucinationComment => "hallucination_comment",
            EvaluationField::EvaluatorsOverallComment => "evaluators_overall_comment",
        }
    }
}

/// 单个字段的修改
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    FormatQuality(u8),
    FormatQualityComment(String),
    OutputVsGroundTruth(u8),
    OutputVsGroundTruthComment(String),
    TableParsingCapabilities(u8),
    TableParsingCapabilitiesComment(String),
    Hallucination(u8),
    HallucinationComment(String),
    EvaluatorsOverallComment(String),
}

/// 填写中的评估
///
/// 同时用作存储后端 `ocr_evaluation_metrics` 行以及 TOML 草稿文件的格式。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_job_id: Option<u64>,
    #[serde(default)]
    pub format_quality: Option<u8>,
    #[serde(default)]
    pub format_quality_comment: Option<String>,
    #[serde(default)]
    pub output_vs_ground_truth: Option<u8>,
    #[serde(default)]
    pub output_vs_ground_truth_comment: Option<String>,
    #[serde(default)]
    pub table_parsing_capabilities: Option<u8>,
    #[serde(default)]
    pub table_parsing_capabilities_comment: Option<String>,
    #[serde(default)]
    pub hallucination: Option<u8>,
    #[serde(default)]
    pub hallucination_comment: Option<String>,
    #[serde(default)]
    pub evaluators_overall_comment: Option<String>,
    #[serde(default)]
    pub evaluation_submitted: bool,
}

fn rating_set(value: Option<u8>) -> bool {
    matches!(value, Some(v) if v != 0)
}

fn comment_set(value: &Option<String>) -> bool {
    matches!(value, Some(s) if !s.trim().is_empty())
}

impl EvaluationDraft {
    /// 合并一个字段，其余字段保持不变
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::FormatQuality(v) => self.format_quality = Some(v),
            FieldUpdate::FormatQualityComment(v) => self.format_quality_comment = Some(v),
            FieldUpdate::OutputVsGroundTruth(v) => self.output_vs_ground_truth = Some(v),
            FieldUpdate::OutputVsGroundTruthComment(v) => {
                self.output_vs_ground_truth_comment = Some(v)
            }
            FieldUpdate::TableParsingCapabilities(v) => self.table_parsing_capabilities = Some(v),
            FieldUpdate::TableParsingCapabilitiesComment(v) => {
                self.table_parsing_capabilities_comment = Some(v)
            }
            FieldUpdate::Hallucination(v) => self.hallucination = Some(v),
            FieldUpdate::HallucinationComment(v) => self.hallucination_comment = Some(v),
            FieldUpdate::EvaluatorsOverallComment(v) => self.evaluators_overall_comment = Some(v),
        }
    }

    /// 把另一份草稿里已填写的字段合并进来
    pub fn merge_from(&mut self, other: EvaluationDraft) {
        for update in other.into_updates() {
            self.apply(update);
        }
    }

    /// 草稿中已填写字段对应的修改列表
    pub fn into_updates(self) -> Vec<FieldUpdate> {
        let mut updates = Vec::new();
        if let Some(v) = self.format_quality {
            updates.push(FieldUpdate::FormatQuality(v));
        }
        if let Some(v) = self.format_quality_comment {
            updates.push(FieldUpdate::FormatQualityComment(v));
        }
        if let Some(v) = self.output_vs_ground_truth {
            updates.push(FieldUpdate::OutputVsGroundTruth(v));
        }
        if let Some(v) = self.output_vs_ground_truth_comment {
            updates.push(FieldUpdate::OutputVsGroundTruthComment(v));
        }
        if let Some(v) = self.table_parsing_capabilities {
            updates.push(FieldUpdate::TableParsingCapabilities(v));
        }
        if let Some(v) = self.table_parsing_capabilities_comment {
            updates.push(FieldUpdate::TableParsingCapabilitiesComment(v));
        }
        if let Some(v) = self.hallucination {
            updates.push(FieldUpdate::Hallucination(v));
        }
        if let Some(v) = self.hallucination_comment {
            updates.push(FieldUpdate::HallucinationComment(v));
        }
        if let Some(v) = self.evaluators_overall_comment {
            updates.push(FieldUpdate::EvaluatorsOverallComment(v));
        }
        updates
    }

    fn is_set(&self, field: EvaluationField) -> bool {
        match field {
            EvaluationField::FormatQuality => rating_set(self.format_quality),
            EvaluationField::FormatQualityComment => comment_set(&self.format_quality_comment),
            EvaluationField::OutputVsGroundTruth => rating_set(self.output_vs_ground_truth),
            EvaluationField::OutputVsGroundTruthComment => {
                comment_set(&self.output_vs_ground_truth_comment)
            }
            EvaluationField::TableParsingCapabilities => {
                rating_set(self.table_parsing_capabilities)
            }
            EvaluationField::TableParsingCapabilitiesComment => {
                comment_set(&self.table_parsing_capabilities_comment)
            }
            EvaluationField::Hallucination => rating_set(self.hallucination),
            EvaluationField::HallucinationComment => comment_set(&self.hallucination_comment),
            EvaluationField::EvaluatorsOverallComment => {
                comment_set(&self.evaluators_overall_comment)
            }
        }
    }

    /// 未填写的必填字段（0 分与空白评语都算未填写）
    pub fn missing_fields(&self) -> Vec<EvaluationField> {
        EvaluationField::REQUIRED
            .into_iter()
            .filter(|field| !self.is_set(*field))
            .collect()
    }

    /// 已填写的评分
    pub fn ratings(&self) -> [(EvaluationField, Option<u8>); 4] {
        [
            (EvaluationField::FormatQuality, self.format_quality),
            (EvaluationField::OutputVsGroundTruth, self.output_vs_ground_truth),
            (
                EvaluationField::TableParsingCapabilities,
                self.table_parsing_capabilities,
            ),
            (EvaluationField::Hallucination, self.hallucination),
        ]
    }
}

/// 完整的评估提交体（`POST /ocr_evaluation`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSubmission {
    pub ocr_job_id: u64,
    pub format_quality: u8,
    pub format_quality_comment: String,
    pub output_vs_ground_truth: u8,
    pub output_vs_ground_truth_comment: String,
    pub table_parsing_capabilities: u8,
    pub table_parsing_capabilities_comment: String,
    pub hallucination: u8,
    pub hallucination_comment: String,
    pub evaluators_overall_comment: String,
    pub evaluation_submitted: bool,
}

fn take_rating(missing: &mut Vec<EvaluationField>, field: EvaluationField, value: Option<u8>) -> u8 {
    match value {
        Some(v) if v != 0 => v,
        _ => {
            missing.push(field);
            0
        }
    }
}

fn take_comment(
    missing: &mut Vec<EvaluationField>,
    field: EvaluationField,
    value: &Option<String>,
) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.clone(),
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

impl EvaluationSubmission {
    /// 从草稿构建提交体
    ///
    /// # 返回
    /// 有必填字段未填写时返回这些字段（按必填顺序）
    pub fn from_draft(job_id: u64, draft: &EvaluationDraft) -> Result<Self, Vec<EvaluationField>> {
        use EvaluationField as F;
        let mut missing = Vec::new();
        let m = &mut missing;

        let submission = Self {
            ocr_job_id: job_id,
            format_quality: take_rating(m, F::FormatQuality, draft.format_quality),
            format_quality_comment: take_comment(
                m,
                F::FormatQualityComment,
                &draft.format_quality_comment,
            ),
            output_vs_ground_truth: take_rating(
                m,
                F::OutputVsGroundTruth,
                draft.output_vs_ground_truth,
            ),
            output_vs_ground_truth_comment: take_comment(
                m,
                F::OutputVsGroundTruthComment,
                &draft.output_vs_ground_truth_comment,
            ),
            table_parsing_capabilities: take_rating(
                m,
                F::TableParsingCapabilities,
                draft.table_parsing_capabilities,
            ),
            table_parsing_capabilities_comment: take_comment(
                m,
                F::TableParsingCapabilitiesComment,
                &draft.table_parsing_capabilities_comment,
            ),
            hallucination: take_rating(m, F::Hallucination, draft.hallucination),
            hallucination_comment: take_comment(
                m,
                F::HallucinationComment,
                &draft.hallucination_comment,
            ),
            evaluators_overall_comment: take_comment(
                m,
                F::EvaluatorsOverallComment,
                &draft.evaluators_overall_comment,
            ),
            evaluation_submitted: true,
        };

        if missing.is_empty() {
            Ok(submission)
        } else {
            Err(missing)
        }
    }
}
