use std::collections::HashSet;

use crate::error::{AppError, AppResult};

/// Configured limits are expressed in kilobytes; declared sizes in bytes.
pub const SIZE_SCALE: i64 = 1024;

pub const DEFAULT_DENIED_EXTENSIONS: [&str; 5] = ["exe", "sh", "sql", "dll", "bat"];

/// An upload as presented by the transport layer.
///
/// The byte source stays owned by the caller's descriptor; admission checks
/// only peek at it and leave its read position where it was.
#[derive(Debug)]
pub struct UploadDescriptor<R> {
    pub byte_source: R,
    pub declared_name: String,
    pub declared_size: i64,
}

impl<R> UploadDescriptor<R> {
    pub fn new(byte_source: R, declared_name: impl Into<String>, declared_size: i64) -> Self {
        Self {
            byte_source,
            declared_name: declared_name.into(),
            declared_size,
        }
    }

    pub fn extension(&self) -> Option<String> {
        extension_of(&self.declared_name)
    }

    pub fn into_inner(self) -> R {
        self.byte_source
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionConfig {
    pub allowed_types: HashSet<String>,
    pub max_size_kb: i64,
    pub denied_extensions: HashSet<String>,
}

impl AdmissionConfig {
    pub fn new(allowed_types: HashSet<String>, max_size_kb: i64) -> Self {
        Self {
            allowed_types,
            max_size_kb,
            denied_extensions: DEFAULT_DENIED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Builds a config from the raw parameter strings a configuration source
    /// hands over: a `;`-delimited allow-list and a size limit in kilobytes.
    pub fn from_params(allow_list: &str, max_size_param: &str) -> AppResult<Self> {
        let max_size_kb = max_size_param.trim().parse::<i64>().map_err(|e| {
            AppError::config(format!(
                "max file size parameter {:?} is not an integer: {}",
                max_size_param, e
            ))
        })?;
        Ok(Self::new(parse_allow_list(allow_list), max_size_kb))
    }

    pub fn with_denied_extensions(mut self, deny_list: &str) -> Self {
        self.denied_extensions = parse_extension_list(deny_list);
        self
    }

    pub fn max_size_bytes(&self) -> i64 {
        self.max_size_kb.saturating_mul(SIZE_SCALE)
    }

    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_types.contains(mime)
    }

    pub fn denies_extension(&self, extension: &str) -> bool {
        self.denied_extensions.contains(&extension.to_lowercase())
    }
}

/// Extension after the last `.` of the final path component, lower-cased.
/// `None` when the name has no dot or ends with one.
pub fn extension_of(declared_name: &str) -> Option<String> {
    let file_name = declared_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// Splits a `;`-delimited allow-list into trimmed MIME strings.
/// Entries keep their case; membership is an exact match.
pub fn parse_allow_list(raw: &str) -> HashSet<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_extension_list(raw: &str) -> HashSet<String> {
    raw.split(';')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
