pub mod diagnostics;
pub mod forms;
pub mod progress;
pub mod upload;
pub mod wizard;

pub use crate::domain::model::{UploadFile, UploadedObject};
pub use crate::domain::ports::{Backend, ConfigProvider, DraftStore};
pub use crate::utils::error::Result;
