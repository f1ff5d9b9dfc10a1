//! Analysis persistence

mod repository;

pub use repository::InMemoryAnalysisRepository;
