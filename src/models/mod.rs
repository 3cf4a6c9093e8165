pub mod ideas;
pub mod image;

pub use ideas::*;
pub use image::*;
