pub mod admission;
pub mod types;

pub use admission::{AdmissionError, Rejection};
pub use types::{AppError, AppResult};
