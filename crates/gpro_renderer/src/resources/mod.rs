pub mod buffer;
pub mod texture;
