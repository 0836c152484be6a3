//! Ordered table of leading-byte signatures.
//!
//! Registration order is match priority: the classifier walks the entries
//! front to back and stops at the first pattern that prefixes the header.
//! Several entries may resolve to the same media type.

use once_cell::sync::Lazy;

use crate::models::MediaType;

/// Number of leading bytes read from a stream for classification.
/// No registered pattern may be longer.
pub const MAX_PROBE_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEntry {
    pub media_type: MediaType,
    pub pattern: &'static [u8],
}

impl SignatureEntry {
    pub const fn new(media_type: MediaType, pattern: &'static [u8]) -> Self {
        Self { media_type, pattern }
    }

    /// True when this entry can decide a header of `available` bytes.
    /// Empty patterns never match.
    pub fn is_eligible(&self, available: usize) -> bool {
        !self.pattern.is_empty() && self.pattern.len() <= available
    }

    pub fn matches(&self, header: &[u8]) -> bool {
        self.is_eligible(header.len()) && header.starts_with(self.pattern)
    }
}

const BUILTIN_SIGNATURES: &[SignatureEntry] = &[
    // %PDF-
    SignatureEntry::new(MediaType::Pdf, &[0x25, 0x50, 0x44, 0x46, 0x2D]),
    SignatureEntry::new(
        MediaType::Png,
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    ),
    SignatureEntry::new(MediaType::Jpeg, &[0xFF, 0xD8, 0xFF]),
    SignatureEntry::new(MediaType::Gif, b"GIF87a"),
    SignatureEntry::new(MediaType::Gif, b"GIF89a"),
    // PK\x03\x04, shared by JAR, DOCX, ODT and friends
    SignatureEntry::new(MediaType::Zip, &[0x50, 0x4B, 0x03, 0x04]),
    SignatureEntry::new(MediaType::Bmp, b"BM"),
    SignatureEntry::new(MediaType::Tiff, &[0x49, 0x49, 0x2A, 0x00]),
    SignatureEntry::new(MediaType::Tiff, &[0x4D, 0x4D, 0x00, 0x2A]),
    // Allow-list vocabulary only
    SignatureEntry::new(MediaType::Csv, &[]),
    SignatureEntry::new(MediaType::PlainText, &[]),
];

/// Immutable after construction; shared freely across threads.
#[derive(Debug, Clone)]
pub struct SignatureRegistry {
    entries: Vec<SignatureEntry>,
}

pub static SIGNATURE_REGISTRY: Lazy<SignatureRegistry> = Lazy::new(|| {
    let registry = SignatureRegistry::from_entries(BUILTIN_SIGNATURES.to_vec());
    tracing::debug!(
        entries = registry.len(),
        "Signature registry initialized"
    );
    registry
});

impl SignatureRegistry {
    /// Builds a registry from entries in priority order.
    ///
    /// Panics if a pattern exceeds [`MAX_PROBE_BYTES`]; such an entry could
    /// never be matched against a probe header.
    pub fn from_entries(entries: Vec<SignatureEntry>) -> Self {
        for entry in &entries {
            assert!(
                entry.pattern.len() <= MAX_PROBE_BYTES,
                "signature for {} is {} bytes, longer than the {} byte probe",
                entry.media_type,
                entry.pattern.len(),
                MAX_PROBE_BYTES
            );
        }
        Self { entries }
    }

    pub fn builtin() -> &'static SignatureRegistry {
        &SIGNATURE_REGISTRY
    }

    pub fn entries(&self) -> &[SignatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, in registration order, whose pattern prefixes `header`.
    pub fn find_match(&self, header: &[u8]) -> Option<&SignatureEntry> {
        self.entries.iter().find(|entry| entry.matches(header))
    }
}
