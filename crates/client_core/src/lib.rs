//! Session model and service access for the document chat client.
//!
//! [`SessionState`] holds the transcript, the loaded documents and the busy flag, and exposes
//! each network operation as a local commit plus a resolution step. [`ConversationController`]
//! couples that state to an [`AnalysisBackend`] for callers that can await inline; the GUI
//! instead keeps the state on its UI thread and runs the backend on a worker.

pub mod backend;
pub mod candidate;
pub mod config;
pub mod controller;
pub mod documents;
pub mod error;
pub mod session;

pub use backend::{AnalysisBackend, HttpAnalysisBackend};
pub use candidate::{FileSource, PdfCandidate};
pub use config::{load_settings, Settings};
pub use controller::{upload_one, ConversationController, UploadSummary};
pub use documents::DocumentStore;
pub use error::{BackendError, ConfigError};
pub use session::{Alert, AlertKind, SessionState, UploadBatch};
