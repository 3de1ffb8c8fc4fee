//! Vision providers and response normalization.
//!
//! The normalizer guarantees every analysis, whatever the provider returned,
//! lands as a complete [`plantdoc_core::PlantAnalysis`] record.

pub mod gemini;
pub mod image;
pub mod normalize;
pub mod plant_id;
pub mod prompt;
pub mod provider;

pub use gemini::GeminiProvider;
pub use image::{load_image, ImagePayload};
pub use normalize::normalize_analysis;
pub use plant_id::PlantIdProvider;
pub use provider::{CareGuide, IdentificationDetails, PlantAnalyzer};
