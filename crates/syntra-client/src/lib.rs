#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod analysis;
mod integration;
mod poller;
mod request;
mod resource;
mod selection;
mod services;

pub mod store;

pub use analysis::AnalysisService;
pub use integration::IntegrationService;
pub use poller::{DEFAULT_POLL_INTERVAL, PollState, ReportPoller};
pub use request::{CreateIntegration, UpdateIntegration};
pub use resource::ResourceSyncService;
pub use selection::SelectionService;
pub use services::SyncServices;
