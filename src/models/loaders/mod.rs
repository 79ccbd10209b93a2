pub mod toml_loader;

pub use toml_loader::{load_engine_options, load_evaluation_draft};
