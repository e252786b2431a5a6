//! Record model, similarity strategies and match scoring

pub mod records;
pub mod qualifications;
pub mod experience;
pub mod weights;
pub mod sequence_matcher;
pub mod embeddings;
pub mod embedding_manager;
pub mod similarity;
pub mod matcher;
pub mod ranking;
pub mod comparison;
