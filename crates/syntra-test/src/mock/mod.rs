//! Mock implementations of syntra service seams.

mod gateway;

pub use gateway::{MockGateway, RecordedCall};
