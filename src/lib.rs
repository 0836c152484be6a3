//! Upload admission service
//!
//! Detects the media type of uploaded content from its leading bytes and
//! decides whether the upload may be accepted, based on a MIME allow-list,
//! an extension deny-list and a size ceiling.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AdmissionError, AppError, AppResult, Rejection};
pub use models::{AdmissionConfig, MediaType, UploadDescriptor};
pub use services::{AdmissionPolicy, SignatureClassifier};
pub use state::AppState;
