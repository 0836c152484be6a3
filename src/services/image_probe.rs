use image::io::Reader as ImageReader;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;
use tracing::{debug, error};

/// Fallback detection that tries to decode bytes as a still image.
pub trait StillImageProbe: Send + Sync {
    /// Returns the decoder's format name (lower-case, e.g. `png`, `jpeg`)
    /// when `bytes` decode as an image. Failures are reported as `None`.
    fn detect_format(&self, bytes: &[u8]) -> Option<String>;
}

/// Probe backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateProbe;

impl ImageCrateProbe {
    pub fn new() -> Self {
        Self
    }
}

impl StillImageProbe for ImageCrateProbe {
    fn detect_format(&self, bytes: &[u8]) -> Option<String> {
        let reader = match ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
            Ok(reader) => reader,
            Err(e) => {
                error!(error = %e, "Image format sniffing failed");
                return None;
            }
        };

        let format = match reader.format() {
            Some(format) => format,
            None => {
                debug!(probe_len = bytes.len(), "No image format recognized");
                return None;
            }
        };

        match reader.decode() {
            Ok(image) => {
                let name = format_name(format);
                let (width, height) = image.dimensions();
                debug!(
                    format = %name,
                    width,
                    height,
                    "Probe bytes decoded as still image"
                );
                Some(name)
            }
            Err(e) => {
                debug!(format = ?format, error = %e, "Probe bytes did not decode as an image");
                None
            }
        }
    }
}

fn format_name(format: ImageFormat) -> String {
    format!("{:?}", format).to_lowercase()
}
