pub mod error;
pub mod store;
pub mod transfer;

pub use error::{Result, StoreError};
pub use store::WordRootStore;
pub use transfer::{ImportAction, ImportPreviewItem, format_csv, parse_csv, preview_import};
