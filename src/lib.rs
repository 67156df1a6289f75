// Docmark Library
// Tiled masked-identifier watermarks for shared PDF reports

pub mod config;
pub mod logging;
pub mod watermark;

pub use watermark::{add_watermark_to_pdf, WatermarkError, WatermarkProcessor, WatermarkedPdf};
