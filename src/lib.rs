pub mod describe;
pub mod error;
pub mod graph;
pub mod models;
pub mod status;
pub mod storage;

pub use error::{Error, Result};
pub use storage::Storage;
