pub mod config;
pub mod core;
pub mod dispatch;
pub mod normalize;
pub mod plugin;
pub mod registry;
pub mod resolver;
pub mod trace;
pub mod value;

pub use config::{ResolverConfig, TraceMode};
pub use crate::core::{core_table, register_core};
pub use dispatch::dispatch;
pub use normalize::{normalize, Normalizer};
pub use plugin::{Plugin, UnknownSourceError, VariableSource};
pub use registry::{UnknownOperationError, UtilityFn, UtilityTable};
pub use resolver::{ResolutionRequest, ResolutionResult, Resolver};
pub use trace::{CaptureSink, JsonLineSink, NullSink, TraceRecord, TraceSink};
pub use value::{FunctionRef, Value};
