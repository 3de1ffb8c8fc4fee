pub mod analysis;
pub mod error;
pub mod prefs;
pub mod scan;
pub mod user;

pub use analysis::{
    ChemicalTreatment, Condition, Disease, FertilizerCare, GrowthRecommendations,
    HealthAssessment, OrganicTreatment, PlantAnalysis, PlantIdentification, PruningCare,
    Severity, SoilCare, SunlightCare, TemperatureCare, Treatments, Urgency, WaterCare,
};
pub use error::PlantDocError;
pub use prefs::{Language, Theme};
pub use scan::{
    DateRange, DetectedDiseaseRow, HealthFilter, HistoryEntry, NewScan, ScanFilter, ScanRecord,
    ScanStats,
};
pub use user::{Session, UserProfile};
