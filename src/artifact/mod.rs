mod label_enum_macro;

pub mod aggregate;
pub mod classify;
pub mod types;

pub use aggregate::{merge, ArtifactAggregator};
pub use classify::ArtifactClassifier;
pub use types::{Artifact, ArtifactType, Setting};
