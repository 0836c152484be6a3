pub mod admission_policy;
pub mod image_probe;
pub mod signature_classifier;
pub mod signature_registry;

pub use admission_policy::AdmissionPolicy;
pub use image_probe::{ImageCrateProbe, StillImageProbe};
pub use signature_classifier::{ProbeHeader, SignatureClassifier};
pub use signature_registry::{SignatureEntry, SignatureRegistry, MAX_PROBE_BYTES};
