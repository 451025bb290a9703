//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Seams
//! - `MetricSource`: where measurements come from
//! - `MetricFilter`: which of them are reported
//! - `MetricsTransport`: how data points leave the process
//! - `MetricsReporter`: one scheduled reporter per endpoint

mod blueprint;
mod endpoint;
mod error;
mod filter;
mod metric;
mod reporter;
mod time_unit;
mod transport;

pub use blueprint::*;
pub use endpoint::EndpointTarget;
pub use error::*;
pub use filter::{AllowAll, MetricFilter};
pub use metric::*;
pub use reporter::*;
pub use time_unit::TimeUnit;
pub use transport::*;
