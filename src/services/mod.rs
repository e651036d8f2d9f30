//! Service layer separating I/O from segmentation logic

pub mod io;

pub use io::ImageIOService;
