pub mod document;
pub mod engine;
pub mod evaluation;
pub mod loaders;
pub mod ocr;
pub mod options;

pub use document::{Document, DocumentProcessing, ProcessDocumentRequest, ValidationErrorBody};
pub use engine::OcrEngine;
pub use evaluation::{EvaluationDraft, EvaluationField, EvaluationSubmission, FieldUpdate};
pub use loaders::{load_engine_options, load_evaluation_draft};
pub use ocr::{
    JobStatus, OcrJob, OcrRequest, OcrResultItem, OcrStartResponse, OcrStatusResponse, PageRange,
    RequestStatus,
};
pub use options::EngineOptions;
