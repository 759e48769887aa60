pub mod agent;
pub mod aggregator;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod logging;
pub mod normalize;
pub mod scoring;
pub mod sources;
pub mod weather;

pub use agent::{AdventureAgent, AgentToolbox};
pub use aggregator::EventAggregator;
pub use config::Config;
pub use domain::{
    AggregationMetadata, AggregationResult, NormalizedRecord, RawRecord, RecordKind,
    SearchCriteria, Source,
};
pub use error::{AgentError, Result};
