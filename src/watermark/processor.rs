//! Watermark processor for stamping whole PDF documents.
//!
//! This module provides the high-level API: load a document, mask the
//! identifier, lay out and render an overlay for every page, merge it and
//! serialize the result. Any failure aborts the whole run.
//!
//! # Example
//!
//! ```ignore
//! use docmark::watermark::{WatermarkConfig, WatermarkProcessor};
//!
//! let processor = WatermarkProcessor::new(WatermarkConfig::default())?;
//! let stamped = processor.watermark_file("relatorio.pdf", "123.456.789-09")?;
//! std::fs::write("relatorio_watermark.pdf", &stamped.bytes)?;
//! ```

use super::compositor::{page_dimensions, Compositor};
use super::position::{calculate_layout, calculate_tiled_positions, PageDimensions, TileLayout};
use super::text_renderer::{parse_hex_color, render_text, Color, TextRenderOptions};
use super::{MaskedIdentifier, WatermarkConfig, WatermarkError};
use lopdf::Document;
use serde::Serialize;
use std::path::Path;

/// Result of a successful watermarking run.
#[derive(Debug, Clone)]
pub struct WatermarkedPdf {
    /// The serialized, stamped document.
    pub bytes: Vec<u8>,
    /// Number of pages stamped (equal to the source page count).
    pub page_count: usize,
    /// The masked token drawn on every page.
    pub token: String,
}

/// Layout chosen for one page, without rendering it.
#[derive(Debug, Clone, Serialize)]
pub struct PagePlan {
    /// 1-based page number.
    pub page: u32,
    pub dimensions: PageDimensions,
    pub layout: TileLayout,
    pub columns: usize,
    pub rows: usize,
    pub tiles: usize,
}

/// Watermark processor for applying tiled identifier watermarks to PDFs.
///
/// Holds only immutable configuration, so one instance can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct WatermarkProcessor {
    config: WatermarkConfig,
    color: Color,
}

impl Default for WatermarkProcessor {
    /// The stock layout: 60% gray Helvetica at 60% opacity.
    fn default() -> Self {
        Self {
            config: WatermarkConfig::default(),
            color: Color::new(0x99, 0x99, 0x99),
        }
    }
}

impl WatermarkProcessor {
    /// Create a processor, validating the configuration up front.
    pub fn new(config: WatermarkConfig) -> Result<Self, WatermarkError> {
        config.validate().map_err(WatermarkError::Config)?;
        let color = parse_hex_color(&config.style.color)?;
        Ok(Self { config, color })
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// Mask `identifier` with the configured rule.
    pub fn mask(&self, identifier: &str) -> Result<MaskedIdentifier, WatermarkError> {
        MaskedIdentifier::from_identifier(identifier, &self.config.mask)
    }

    /// Stamp the PDF at `path`. The source file is never modified.
    pub fn watermark_file(
        &self,
        path: impl AsRef<Path>,
        identifier: &str,
    ) -> Result<WatermarkedPdf, WatermarkError> {
        let bytes = read_source(path.as_ref())?;
        self.watermark_bytes(&bytes, identifier)
    }

    /// Stamp an in-memory PDF.
    pub fn watermark_bytes(
        &self,
        pdf: &[u8],
        identifier: &str,
    ) -> Result<WatermarkedPdf, WatermarkError> {
        let token = self.mask(identifier)?;
        tracing::info!(token = %token, "Applying identifier watermark");

        let mut doc = load_document(pdf)?;
        let page_count = self.watermark_document(&mut doc, &token)?;

        let mut bytes = Vec::with_capacity(pdf.len() + page_count * 4096);
        doc.save_to(&mut bytes)
            .map_err(|e| WatermarkError::Serialize(e.to_string()))?;

        tracing::info!(
            pages = page_count,
            input_bytes = pdf.len(),
            output_bytes = bytes.len(),
            "Watermark applied"
        );

        Ok(WatermarkedPdf {
            bytes,
            page_count,
            token: token.to_string(),
        })
    }

    /// Stamp every page of an already loaded document in place.
    ///
    /// Returns the number of pages stamped. On error the document may be
    /// partially modified and must be discarded.
    pub fn watermark_document(
        &self,
        doc: &mut Document,
        token: &MaskedIdentifier,
    ) -> Result<usize, WatermarkError> {
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(WatermarkError::Parse("document has no pages".to_string()));
        }

        let compositor = Compositor::install(doc, &self.config.style);

        for (&page_number, &page_id) in &pages {
            let page = page_dimensions(doc, page_id)
                .map_err(|e| WatermarkError::render(page_number, e))?;
            let layout = calculate_layout(token.char_count(), &page, &self.config.tiling);
            let positions = calculate_tiled_positions(&page, &layout);

            tracing::debug!(
                page = page_number,
                width = page.width,
                height = page.height,
                font_size = layout.font_size,
                spacing_x = layout.spacing_x,
                spacing_y = layout.spacing_y,
                tiles = positions.len(),
                "Page layout"
            );

            let names = compositor
                .prepare_page(doc, page_id)
                .map_err(|e| WatermarkError::render(page_number, e))?;

            let options = TextRenderOptions {
                text: token.as_str(),
                font_size: layout.font_size,
                color: self.color,
                font_resource: &names.font,
                graphics_state_resource: &names.graphics_state,
            };
            let overlay = render_text(&options, &page, &positions)
                .map_err(|e| WatermarkError::render(page_number, e))?;

            compositor
                .attach_overlay(doc, page_id, overlay)
                .map_err(|e| WatermarkError::render(page_number, e))?;
        }

        Ok(pages.len())
    }

    /// Compute the per-page layout of `pdf` without stamping it.
    pub fn plan_bytes(
        &self,
        pdf: &[u8],
        identifier: &str,
    ) -> Result<Vec<PagePlan>, WatermarkError> {
        let token = self.mask(identifier)?;
        let doc = load_document(pdf)?;

        doc.get_pages()
            .into_iter()
            .map(|(page_number, page_id)| {
                let dimensions = page_dimensions(&doc, page_id)
                    .map_err(|e| WatermarkError::render(page_number, e))?;
                let layout =
                    calculate_layout(token.char_count(), &dimensions, &self.config.tiling);
                let columns = layout.columns(&dimensions);
                let rows = layout.rows(&dimensions);
                Ok(PagePlan {
                    page: page_number,
                    dimensions,
                    layout,
                    columns,
                    rows,
                    tiles: columns * rows,
                })
            })
            .collect()
    }

    /// Like [`plan_bytes`](Self::plan_bytes), reading the document from disk.
    pub fn plan_file(
        &self,
        path: impl AsRef<Path>,
        identifier: &str,
    ) -> Result<Vec<PagePlan>, WatermarkError> {
        let bytes = read_source(path.as_ref())?;
        self.plan_bytes(&bytes, identifier)
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>, WatermarkError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WatermarkError::SourceNotFound(path.to_path_buf()),
        _ => WatermarkError::Io(e),
    })
}

fn load_document(pdf: &[u8]) -> Result<Document, WatermarkError> {
    let doc = Document::load_mem(pdf).map_err(|e| WatermarkError::Parse(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(WatermarkError::Parse(
            "encrypted documents are not supported".to_string(),
        ));
    }
    Ok(doc)
}
