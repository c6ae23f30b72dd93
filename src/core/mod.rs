pub mod client;
pub mod probe;
pub mod records;
pub mod session;

pub use crate::domain::model::{
    Command, CountOutcome, ListParams, ProbeDefinition, ProbeFailure, ProbeOutcome, ProbeReport,
    Record, RecordPage,
};
pub use crate::domain::ports::{ConfigProvider, RecordSource};
pub use crate::utils::error::Result;
