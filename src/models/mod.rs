pub mod gemini;
pub mod image;
pub mod tryon;

pub use gemini::*;
pub use image::*;
pub use tryon::*;
