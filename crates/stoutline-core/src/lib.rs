pub mod analysis;
pub mod buffer;
pub mod config;
pub mod consts;
pub mod detection;
pub mod error;
pub mod io;
pub mod overlay;
pub mod sampler;
pub mod scoring;

pub use analysis::{AnalysisResult, Analyzer};
pub use buffer::PixelBuffer;
pub use config::AnalyzerConfig;
pub use error::{Result, StoutError};
pub use scoring::ScoreResult;
