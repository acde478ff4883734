pub mod conversion;
pub mod io;
pub mod models;
pub mod splitting;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use conversion::{
    ConversionError, Dialect, MarkerVocabulary, Pipeline, PipelineConfig, convert,
};
pub use io::*;
pub use models::*;
pub use splitting::{SplitState, Splitter, split};
