use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::rate_limit::ConcurrencyGate;
use crate::models::AdmissionConfig;
use crate::services::AdmissionPolicy;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub admission: Arc<AdmissionConfig>,
    pub policy: Arc<AdmissionPolicy>,
    pub gate: Arc<ConcurrencyGate>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let admission = config.admission()?;
        let gate = ConcurrencyGate::new(config.max_concurrent_requests);
        Ok(Self {
            config: Arc::new(config),
            admission: Arc::new(admission),
            policy: Arc::new(AdmissionPolicy::new()),
            gate: Arc::new(gate),
        })
    }

    /// Upper bound on bodies buffered whole (`/classify`): the size limit
    /// plus room for framing.
    pub fn body_limit(&self) -> usize {
        const MULTIPART_OVERHEAD: usize = 64 * 1024;
        usize::try_from(self.admission.max_size_bytes())
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD)
    }
}
