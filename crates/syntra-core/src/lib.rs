#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod gateway;
mod health;
mod session;

pub mod types;

pub use error::{ApiError, ApiResult, STATUS_TRANSPORT};
pub use gateway::{ApiGateway, GatewayResult, decode_payload};
pub use health::{ServiceHealth, ServiceStatus};
pub use session::{SessionProvider, StaticSession};
