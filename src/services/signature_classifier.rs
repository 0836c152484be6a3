//! Content-based media type detection.
//!
//! The classifier peeks at up to [`MAX_PROBE_BYTES`] leading bytes of a
//! seekable stream, matches them against the signature registry, falls back
//! to a still-image probe, and finally resolves to
//! `application/octet-stream`. It never fails on content; only I/O errors
//! from the stream itself are returned.

use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, warn};

use crate::models::MediaType;
use crate::services::image_probe::{ImageCrateProbe, StillImageProbe};
use crate::services::signature_registry::{SignatureRegistry, MAX_PROBE_BYTES};

/// Leading bytes captured from a stream, at most [`MAX_PROBE_BYTES`] long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeHeader {
    buf: [u8; MAX_PROBE_BYTES],
    len: usize,
}

impl ProbeHeader {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_PROBE_BYTES);
        let mut buf = [0u8; MAX_PROBE_BYTES];
        buf[..len].copy_from_slice(&bytes[..len]);
        Self { buf, len }
    }

    /// Reads the header from `stream` and seeks back to where the stream was,
    /// whether or not the read succeeded.
    pub fn peek<R: Read + Seek>(stream: &mut R) -> io::Result<Self> {
        let start = stream.stream_position()?;
        let mut buf = [0u8; MAX_PROBE_BYTES];
        let read = read_up_to(stream, &mut buf);
        stream.seek(SeekFrom::Start(start))?;
        Ok(Self { buf, len: read? })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// A single `read` may return short before end of stream.
fn read_up_to<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub struct SignatureClassifier<P = ImageCrateProbe> {
    registry: &'static SignatureRegistry,
    probe: P,
}

impl SignatureClassifier<ImageCrateProbe> {
    pub fn new() -> Self {
        Self::with_probe(ImageCrateProbe::new())
    }
}

impl Default for SignatureClassifier<ImageCrateProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StillImageProbe> SignatureClassifier<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            registry: SignatureRegistry::builtin(),
            probe,
        }
    }

    pub fn registry(&self) -> &SignatureRegistry {
        self.registry
    }

    /// Detects the media type of `stream` without moving its read position.
    pub fn classify<R: Read + Seek>(&self, stream: &mut R) -> io::Result<MediaType> {
        let header = ProbeHeader::peek(stream).map_err(|e| {
            warn!(error = %e, "Failed to read probe header");
            e
        })?;
        Ok(self.classify_header(header.as_bytes()))
    }

    /// Classifies an already captured header. Only the first
    /// [`MAX_PROBE_BYTES`] bytes are considered.
    pub fn classify_header(&self, header: &[u8]) -> MediaType {
        let window = ProbeHeader::from_bytes(header);
        let header = window.as_bytes();
        if header.is_empty() {
            debug!("Empty stream, using fallback media type");
            return MediaType::OctetStream;
        }

        if let Some(entry) = self.registry.find_match(header) {
            debug!(media_type = %entry.media_type, "Matched leading-byte signature");
            return entry.media_type;
        }

        if let Some(media_type) = self
            .probe
            .detect_format(header)
            .and_then(|name| MediaType::from_image_format_name(&name))
        {
            debug!(media_type = %media_type, "Resolved media type by image decoding");
            return media_type;
        }

        debug!(probe_len = header.len(), "No signature matched, using fallback media type");
        MediaType::OctetStream
    }
}
