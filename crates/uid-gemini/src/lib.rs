//! Minimal Gemini `generateContent` client used by the UI designer tools.

pub mod client;
pub mod image;
pub mod types;

pub use client::{GeminiClient, GenerativeApi};
pub use image::resolve_image;
pub use types::{
    Blob, Candidate, Content, FileData, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part,
};
