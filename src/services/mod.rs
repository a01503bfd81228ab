//! I/O and format services supporting the pipeline

pub mod format;
pub mod io;

pub use format::OutputFormatHandler;
pub use io::ImageIoService;
