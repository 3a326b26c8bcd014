//! Personal media-archiving toolkit core.
//!
//! Detects which platform a URL belongs to, compiles user filters into
//! engine-native configurations, routes each URL to one of three download
//! engines (video extractor, file-host manager, browser automation) and
//! orchestrates batches with duplicate suppression, anti-rate-limit pacing
//! and an optional cloud-upload step.

pub mod downloader;

pub use downloader::{
    BatchSummary, DownloadFilter, EngineChoice, EngineSet, Orchestrator, PacingPolicy,
};
