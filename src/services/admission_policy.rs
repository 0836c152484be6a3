use std::collections::HashSet;
use std::io::{Read, Seek};
use tracing::{debug, info};

use crate::error::{AdmissionError, Rejection};
use crate::models::{extension_of, AdmissionConfig, MediaType, UploadDescriptor};
use crate::services::image_probe::{ImageCrateProbe, StillImageProbe};
use crate::services::signature_classifier::SignatureClassifier;

/// Accept/reject decisions for uploads.
///
/// The two checks are independent: [`check_upload`](Self::check_upload)
/// looks only at the declared name and size, [`check_type`](Self::check_type)
/// only at content. Configuration is passed on every call.
pub struct AdmissionPolicy<P = ImageCrateProbe> {
    classifier: SignatureClassifier<P>,
}

impl AdmissionPolicy<ImageCrateProbe> {
    pub fn new() -> Self {
        Self::with_classifier(SignatureClassifier::new())
    }
}

impl Default for AdmissionPolicy<ImageCrateProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StillImageProbe> AdmissionPolicy<P> {
    pub fn with_classifier(classifier: SignatureClassifier<P>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &SignatureClassifier<P> {
        &self.classifier
    }

    /// Accepts when the content-detected media type is on the allow-list.
    /// Returns the detected type on success.
    pub fn check_type<R: Read + Seek>(
        &self,
        stream: &mut R,
        allowed_types: &HashSet<String>,
    ) -> Result<MediaType, AdmissionError> {
        let detected = self.classifier.classify(stream)?;
        debug!(media_type = %detected, "Document media type detected");

        if allowed_types.contains(detected.as_str()) {
            debug!(media_type = %detected, "Document accepted due to valid type");
            Ok(detected)
        } else {
            info!(media_type = %detected, "Document rejected due to invalid type");
            Err(Rejection::TypeNotMatched { detected }.into())
        }
    }

    /// Checks the declared extension against the deny-list and the declared
    /// size against the configured limit. An absent upload passes.
    pub fn check_upload<R>(
        &self,
        descriptor: Option<&UploadDescriptor<R>>,
        config: &AdmissionConfig,
    ) -> Result<(), Rejection> {
        let Some(descriptor) = descriptor else {
            return Ok(());
        };

        self.check_name(&descriptor.declared_name, config)?;

        let limit = config.max_size_bytes();
        debug!(
            file_name = %descriptor.declared_name,
            file_size = descriptor.declared_size,
            max_size = limit,
            "Checking declared file size"
        );
        if descriptor.declared_size > limit {
            info!(
                file_name = %descriptor.declared_name,
                file_size = descriptor.declared_size,
                max_size = limit,
                "Upload rejected due to size"
            );
            return Err(Rejection::FileTooLarge {
                size: descriptor.declared_size,
                limit,
            });
        }

        Ok(())
    }

    /// Extension half of [`check_upload`](Self::check_upload). Needs only the
    /// declared name, so transports can run it before reading any content.
    pub fn check_name(
        &self,
        declared_name: &str,
        config: &AdmissionConfig,
    ) -> Result<(), Rejection> {
        let extension = extension_of(declared_name);
        match extension.as_deref() {
            Some(ext) if !config.denies_extension(ext) => Ok(()),
            _ => {
                info!(
                    file_name = %declared_name,
                    extension = ?extension,
                    "Upload rejected due to missing or denied extension"
                );
                Err(Rejection::FiletypeNotAcceptable { extension })
            }
        }
    }

    /// Runs the name/size check, then the content check.
    pub fn admit<R: Read + Seek>(
        &self,
        descriptor: &mut UploadDescriptor<R>,
        config: &AdmissionConfig,
    ) -> Result<MediaType, AdmissionError> {
        self.check_upload(Some(&*descriptor), config)?;
        let media_type = self.check_type(&mut descriptor.byte_source, &config.allowed_types)?;
        info!(
            file_name = %descriptor.declared_name,
            media_type = %media_type,
            "Upload admitted"
        );
        Ok(media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_allow_list;
    use std::io::Cursor;

    fn config(max_size_kb: i64) -> AdmissionConfig {
        AdmissionConfig::new(parse_allow_list("application/pdf;text/csv"), max_size_kb)
    }

    fn upload(name: &str, size: i64) -> UploadDescriptor<Cursor<Vec<u8>>> {
        UploadDescriptor::new(Cursor::new(b"%PDF-1.5\n".to_vec()), name, size)
    }

    #[test]
    fn denied_extensions_reject_regardless_of_size() {
        let policy = AdmissionPolicy::new();
        for name in ["a.exe", "a.EXE", "a.Sh", "a.sql", "a.dll", "a.bat"] {
            let err = policy.check_upload(Some(&upload(name, 0)), &config(100)).unwrap_err();
            assert!(
                matches!(err, Rejection::FiletypeNotAcceptable { .. }),
                "{} should be rejected",
                name
            );
            assert_eq!(err.to_string(), "Filetype not acceptable.");
        }
    }

    #[test]
    fn missing_extension_rejects() {
        let policy = AdmissionPolicy::new();
        let err = policy.check_upload(Some(&upload("Makefile", 1)), &config(100)).unwrap_err();
        assert_eq!(err, Rejection::FiletypeNotAcceptable { extension: None });
    }

    #[test]
    fn size_limit_is_inclusive_in_kilobytes() {
        let policy = AdmissionPolicy::new();
        let config = config(8);
        assert!(policy.check_upload(Some(&upload("data.csv", 8 * 1024)), &config).is_ok());

        let err = policy
            .check_upload(Some(&upload("data.csv", 8 * 1024 + 1)), &config)
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::FileTooLarge {
                size: 8 * 1024 + 1,
                limit: 8 * 1024
            }
        );
        assert_eq!(err.to_string(), "File size exceeds max file size.");
    }

    #[test]
    fn absent_upload_passes() {
        let policy = AdmissionPolicy::new();
        assert!(policy
            .check_upload::<Cursor<Vec<u8>>>(None, &config(0))
            .is_ok());
    }

    #[test]
    fn type_check_uses_exact_membership() {
        let policy = AdmissionPolicy::new();
        let mut stream = Cursor::new(b"%PDF-1.7".to_vec());

        let allowed = parse_allow_list("application/pdf");
        assert_eq!(policy.check_type(&mut stream, &allowed).unwrap(), MediaType::Pdf);

        let allowed = parse_allow_list("APPLICATION/PDF;image/png");
        let err = policy.check_type(&mut stream, &allowed).unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::TypeNotMatched {
                detected: MediaType::Pdf
            })
        );
        assert_eq!(err.to_string(), "File Type Not Matched..");
    }

    #[test]
    fn fallback_type_can_be_allow_listed() {
        let policy = AdmissionPolicy::new();
        let mut stream = Cursor::new(b"plain bytes".to_vec());
        let allowed = parse_allow_list("application/octet-stream");
        assert_eq!(
            policy.check_type(&mut stream, &allowed).unwrap(),
            MediaType::OctetStream
        );
    }

    #[test]
    fn admit_leaves_stream_readable() {
        let policy = AdmissionPolicy::new();
        let mut descriptor = upload("report.pdf", 9);
        assert_eq!(policy.admit(&mut descriptor, &config(1)).unwrap(), MediaType::Pdf);

        let mut content = Vec::new();
        descriptor.into_inner().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"%PDF-1.5\n");
    }

    #[test]
    fn admit_checks_name_before_content() {
        let policy = AdmissionPolicy::new();
        let mut descriptor = upload("malware.exe", 9);
        let err = policy.admit(&mut descriptor, &config(1)).unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::Rejected(Rejection::FiletypeNotAcceptable { .. })
        ));
    }

    struct JpegDecoder;

    impl StillImageProbe for JpegDecoder {
        fn detect_format(&self, _bytes: &[u8]) -> Option<String> {
            Some("jpeg".to_string())
        }
    }

    #[test]
    fn type_check_accepts_through_image_decoding() {
        let policy = AdmissionPolicy::with_classifier(SignatureClassifier::with_probe(JpegDecoder));
        let mut stream = Cursor::new(b"no known signature".to_vec());

        let allowed = parse_allow_list("image/jpeg");
        assert_eq!(policy.check_type(&mut stream, &allowed).unwrap(), MediaType::Jpeg);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn name_check_needs_no_content() {
        let policy = AdmissionPolicy::new();
        assert!(policy.check_name("uploads/report.PDF", &config(1)).is_ok());
        assert_eq!(
            policy.check_name("setup.Exe", &config(1)),
            Err(Rejection::FiletypeNotAcceptable {
                extension: Some("exe".to_string())
            })
        );
        assert!(policy.check_name("", &config(1)).is_err());
    }
}
