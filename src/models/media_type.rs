use serde::{Serialize, Serializer};
use std::fmt;

/// Media types the classifier can resolve.
///
/// `Csv` and `PlainText` are never produced by signature matching; they are
/// listed so allow-lists can name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    Pdf,
    Png,
    Jpeg,
    Gif,
    Zip,
    Bmp,
    Tiff,
    Csv,
    PlainText,
    #[default]
    OctetStream,
}

impl MediaType {
    pub const ALL: [MediaType; 10] = [
        MediaType::Pdf,
        MediaType::Png,
        MediaType::Jpeg,
        MediaType::Gif,
        MediaType::Zip,
        MediaType::Bmp,
        MediaType::Tiff,
        MediaType::Csv,
        MediaType::PlainText,
        MediaType::OctetStream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Gif => "image/gif",
            MediaType::Zip => "application/zip",
            MediaType::Bmp => "image/bmp",
            MediaType::Tiff => "image/tiff",
            MediaType::Csv => "text/csv",
            MediaType::PlainText => "text/plain",
            MediaType::OctetStream => "application/octet-stream",
        }
    }

    /// Looks up a MIME string. Matching is exact, as in allow-list checks.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|media_type| media_type.as_str() == mime)
    }

    /// Maps a still-image decoder's format name to a media type.
    /// Only PNG and JPEG are recognized here.
    pub fn from_image_format_name(name: &str) -> Option<Self> {
        match name {
            "png" => Some(MediaType::Png),
            "jpeg" => Some(MediaType::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
