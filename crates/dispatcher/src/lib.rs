//! # Dispatcher
//!
//! 指标上报分发模块。
//!
//! 负责：
//! - 为每个 endpoint 构建并启动一个 reporter
//! - 单个 endpoint 失败不影响其他 endpoint
//! - 统一触发立即上报与停止

pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod format;
pub mod handle;
pub mod metrics;
pub mod transports;

pub use contracts::{MetricsReporter, MetricsTransport};
pub use dispatcher::{create_dispatcher, DefaultReporter, DispatcherState, ReporterDispatcher};
pub use error::DispatcherError;
pub use factory::{ReporterFactory, TransportFactory};
pub use format::PointFormatter;
pub use handle::ReporterHandle;
pub use metrics::{MetricsSnapshot, ReporterMetrics};
pub use transports::{encode_batches, ConfiguredTransport, LogTransport, UdpTransport, UdpTransportConfig};
