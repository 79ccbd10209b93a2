pub mod ocr_client;
pub mod store_client;

#[cfg(test)]
pub(crate) mod testing;

pub use ocr_client::{OcrApi, OcrApiClient};
pub use store_client::StoreClient;
