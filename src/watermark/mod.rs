//! Watermark module for stamping masked identifiers onto PDF documents.
//!
//! Every page of a shared report gets a dense, semi-transparent grid of the
//! reader's masked identifier, so a leaked copy points back to whoever
//! downloaded it while the report itself stays readable.
//!
//! # Features
//!
//! - **Identifier masking**: `123.456.789-09` becomes `123XXXXXX09`
//! - **Per-page layout**: font size and tile pitch follow each page's size
//! - **Non-destructive merge**: original content is kept, the overlay is
//!   drawn on top with its own graphics state
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   tiling:
//!     horizontal_spacing_factor: 2.5
//!     vertical_spacing_factor: 3.5
//!   style:
//!     color: "#999999"
//!     opacity: 0.6
//! ```

pub mod compositor;
pub mod config;
pub mod delivery;
pub mod error;
pub mod mask;
pub mod position;
pub mod processor;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{page_dimensions, Compositor, PageResources};
pub use config::{MaskConfig, StyleConfig, TilingConfig, WatermarkConfig, STANDARD_FONTS};
pub use delivery::{download_filename, DeliveryKind};
pub use error::WatermarkError;
pub use mask::{clean_identifier, MaskedIdentifier};
pub use position::{
    calculate_font_size, calculate_layout, calculate_spacing, calculate_tiled_positions,
    PageDimensions, PlacementPosition, TileLayout, MAX_PAGE_EXTENT,
};
pub use processor::{PagePlan, WatermarkProcessor, WatermarkedPdf};
pub use text_renderer::{parse_hex_color, render_operations, render_text, Color, TextRenderOptions};

use std::path::Path;
use std::sync::OnceLock;

static DEFAULT_PROCESSOR: OnceLock<WatermarkProcessor> = OnceLock::new();

/// Stamp the PDF at `path` with the masked `identifier` using the default
/// layout.
///
/// Returns `None` on any failure; the reason is logged at error level.
/// Every call shares one default [`WatermarkProcessor`]; build your own
/// to use another configuration or to get the typed error.
pub fn add_watermark_to_pdf(path: impl AsRef<Path>, identifier: &str) -> Option<Vec<u8>> {
    let path = path.as_ref();
    let processor = DEFAULT_PROCESSOR.get_or_init(WatermarkProcessor::default);

    match processor.watermark_file(path, identifier) {
        Ok(stamped) => Some(stamped.bytes),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to watermark PDF");
            None
        }
    }
}
