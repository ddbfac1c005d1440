// Settings extraction
//
// Each extractor turns one document shape into an ordered list of
// (key, value) settings. All of them share a single ValueNormalizer and
// never fail: a document or node they do not recognize contributes nothing.

pub mod compliance;
pub mod detector;
pub mod normalize;
pub mod payload;
pub mod settings_catalog;

use crate::artifact::Setting;
use serde_json::Value;

pub use compliance::{CompliancePolicyExtractor, EnrollmentRestrictionExtractor};
pub use detector::{DocumentShape, Extraction, FormatDetector};
pub use normalize::ValueNormalizer;
pub use payload::PayloadExtractor;
pub use settings_catalog::SettingsCatalogExtractor;

/// Converts one parsed document into settings
pub trait SettingsExtractor {
    fn extract(&self, doc: &Value) -> Vec<Setting>;
}
