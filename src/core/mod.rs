pub mod gaql;
pub mod serialize;
pub mod server;
pub mod tools;
pub mod truncate;

pub use crate::domain::model::{AccountRecord, QueryReport, ResponseFormat};
pub use crate::domain::ports::GaqlExecutor;
pub use crate::utils::error::Result;
