pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod release;
pub mod report;
pub mod storage;
pub mod table;
pub mod types;

pub use config::{Config, TeamProfile};
pub use error::{DatasetError, Result};
pub use pipeline::{PipelineOutput, ValidationPipeline};
