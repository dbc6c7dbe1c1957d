//! Service implementations

pub mod generator;
pub mod notify;
pub mod openai;
pub mod placeholder_audio;
pub mod sheets;
