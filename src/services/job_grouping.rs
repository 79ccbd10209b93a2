//! 任务分组与筛选 - 业务能力层
//!
//! 把扁平的任务列表按 request_id 分组，推导每组的汇总状态、引擎与页码范围，
//! 再按文本、状态、引擎三个条件同时筛选。

use std::collections::HashMap;

use crate::models::{Document, JobStatus, OcrEngine, OcrJob, PageRange};

/// 同一个请求下的任务
///
/// 只能通过 [`group_jobs`] 构造，保证至少包含一个任务。
#[derive(Debug, Clone, PartialEq)]
pub struct JobGroup {
    request_id: u64,
    jobs: Vec<OcrJob>,
}

impl JobGroup {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn jobs(&self) -> &[OcrJob] {
        &self.jobs
    }

    pub fn document_id(&self) -> &str {
        &self.jobs[0].document_id
    }

    /// 汇总状态：error > processing > pending > completed
    pub fn status(&self) -> JobStatus {
        let any = |status: JobStatus| self.jobs.iter().any(|job| job.status == status);
        if any(JobStatus::Error) {
            JobStatus::Error
        } else if any(JobStatus::Processing) {
            JobStatus::Processing
        } else if any(JobStatus::Pending) {
            JobStatus::Pending
        } else {
            JobStatus::Completed
        }
    }

    /// 出现过的引擎（按发现顺序去重）
    pub fn engines(&self) -> Vec<OcrEngine> {
        let mut engines = Vec::new();
        for job in &self.jobs {
            if !engines.contains(&job.ocr_model) {
                engines.push(job.ocr_model);
            }
        }
        engines
    }

    /// 任务覆盖的页码范围
    pub fn page_range(&self) -> PageRange {
        let first = self.jobs.iter().map(|j| j.page_number).min().unwrap_or(0);
        let last = self.jobs.iter().map(|j| j.page_number).max().unwrap_or(0);
        PageRange::new(first, last)
    }

    /// 最早的创建时间
    pub fn created_at(&self) -> &str {
        self.jobs
            .iter()
            .map(|j| j.created_at.as_str())
            .min()
            .unwrap_or("")
    }
}

/// 按 request_id 分组，保持发现顺序
pub fn group_jobs(jobs: &[OcrJob]) -> Vec<JobGroup> {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut groups: Vec<JobGroup> = Vec::new();

    for job in jobs {
        match index.get(&job.request_id) {
            Some(&i) => groups[i].jobs.push(job.clone()),
            None => {
                index.insert(job.request_id, groups.len());
                groups.push(JobGroup {
                    request_id: job.request_id,
                    jobs: vec![job.clone()],
                });
            }
        }
    }

    groups
}

/// 展开分组，得到原来的全部任务
pub fn flatten_groups(groups: &[JobGroup]) -> Vec<OcrJob> {
    groups.iter().flat_map(|g| g.jobs.iter().cloned()).collect()
}

/// 文档索引：document_id → Document
pub fn index_documents(documents: &[Document]) -> HashMap<String, Document> {
    documents
        .iter()
        .map(|doc| (doc.id.clone(), doc.clone()))
        .collect()
}

/// 三个维度的筛选条件，未设置的维度不参与筛选
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    pub engine: Option<OcrEngine>,
}

impl JobFilter {
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none() && self.status.is_none() && self.engine.is_none()
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// 文本条件：标题、barcode、请求 ID、页码或 OCR 文本包含关键字（忽略大小写）
    pub fn matches_search(&self, group: &JobGroup, documents: &HashMap<String, Document>) -> bool {
        let Some(term) = self.search_term() else {
            return true;
        };

        if let Some(doc) = documents.get(group.document_id()) {
            if doc.title.to_lowercase().contains(&term) || doc.barcode.to_string().contains(&term)
            {
                return true;
            }
        }

        if group.request_id.to_string().contains(&term) {
            return true;
        }

        group.jobs.iter().any(|job| {
            job.page_number.to_string().contains(&term)
                || job.ocr_output.to_lowercase().contains(&term)
        })
    }

    /// 状态条件：汇总状态相等
    pub fn matches_status(&self, group: &JobGroup) -> bool {
        self.status.map_or(true, |status| group.status() == status)
    }

    /// 引擎条件：组内出现过该引擎
    pub fn matches_engine(&self, group: &JobGroup) -> bool {
        self.engine
            .map_or(true, |engine| group.jobs.iter().any(|job| job.ocr_model == engine))
    }

    /// 三个条件同时满足
    pub fn matches(&self, group: &JobGroup, documents: &HashMap<String, Document>) -> bool {
        self.matches_search(group, documents) && self.matches_status(group) && self.matches_engine(group)
    }

    /// 筛选分组，保持原顺序
    pub fn apply<'a>(
        &self,
        groups: &'a [JobGroup],
        documents: &HashMap<String, Document>,
    ) -> Vec<&'a JobGroup> {
        groups
            .iter()
            .filter(|group| self.matches(group, documents))
            .collect()
    }
}
