// Download pipeline - site detection, filter compilation, engine routing

pub mod dates;
pub mod engines;
pub mod errors;
pub mod filters;
pub mod history;
pub mod intent;
pub mod models;
pub mod orchestrator;
pub mod router;
pub mod sites;
pub mod traits;
pub mod utils;
pub mod validator;

pub use engines::{BrowserEngine, EngineSet, JDownloaderEngine, YtDlpEngine};
pub use errors::EngineError;
pub use filters::{AcceptFilter, EngineConfig};
pub use models::{
    DownloadFilter, DownloadOutcome, DownloadScope, EngineChoice, MediaProbe, ProgressUpdate,
};
pub use orchestrator::{BatchSummary, Orchestrator, PacingPolicy, UrlReport, UrlState};
pub use sites::SiteCapability;
pub use traits::{CloudUploader, DownloadEngine, HistoryStore, NullObserver, ProgressObserver};
