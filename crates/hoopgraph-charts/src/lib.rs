// Chart-data pipeline: turns chart requests into line, histogram, and
// scatter payloads over a season record store.

pub mod awards;
pub mod builders;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod payload;
pub mod pipeline;
pub mod request;
pub mod stats;

pub use awards::{normalize_awards, AwardRules};
pub use error::GraphError;
pub use filter::{filter_records, FilterCriteria};
pub use payload::GraphPayload;
pub use pipeline::{build_graph, Deadline, GraphOutcome, GraphPipeline, PipelineSettings, PipelineStats};
pub use request::{GraphKind, GraphRequest};
