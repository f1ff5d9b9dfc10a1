//! Infrastructure services

mod analysis_service;

pub use analysis_service::{AnalysisModels, AnalysisOutcome, AnalysisService, ModelVersion};
