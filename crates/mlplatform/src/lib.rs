pub mod error;
pub mod storage;
pub mod training;
pub mod metrics;
pub mod endpoint;
pub mod invoke;

pub use error::*;
pub use storage::*;
pub use training::*;
pub use metrics::*;
pub use endpoint::*;
pub use invoke::*;
