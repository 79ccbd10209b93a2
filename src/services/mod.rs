pub mod document_service;
pub mod evaluation_form;
pub mod job_grouping;
pub mod result_merger;
pub mod status_poller;
pub mod submission_service;

pub use document_service::{build_ingest_request, ingest_document};
pub use evaluation_form::EvaluationForm;
pub use job_grouping::{flatten_groups, group_jobs, index_documents, JobFilter, JobGroup};
pub use result_merger::ResultMerger;
pub use status_poller::StatusPoller;
pub use submission_service::SubmissionService;
