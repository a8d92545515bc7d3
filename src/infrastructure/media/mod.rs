//! Media store implementations

mod cloudinary;
mod in_memory;

pub use cloudinary::{CloudinaryConfig, CloudinaryMediaStore, DEFAULT_CLOUDINARY_BASE_URL};
pub use in_memory::InMemoryMediaStore;
