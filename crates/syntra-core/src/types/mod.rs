//! Domain models shared across syntra crates.

mod integration;
mod report;
mod resource;

pub use integration::{Integration, IntegrationStatus, ServiceType};
pub use report::{AnalysisReport, AnalysisStatus, ResourceAnalysis, SubAnalysis};
pub use resource::{ResourceType, SELECTED_FOR_ANALYSIS_KEY, ServiceResource};
