//! Input processing module
//! Loads profiles and job datasets, and extracts resume text

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use manager::InputManager;
