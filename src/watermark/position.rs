//! Tile layout calculation for watermark placement.
//!
//! Every page is laid out independently because pages of one document can
//! have different physical sizes. The layout is a pure function of the page
//! dimensions, the token length and the [`TilingConfig`], so stamping the same
//! document twice yields the same grid.
//!
//! # Example
//!
//! ```ignore
//! use docmark::watermark::position::{calculate_layout, calculate_tiled_positions, PageDimensions};
//! use docmark::watermark::TilingConfig;
//!
//! let page = PageDimensions::new(612.0, 792.0);
//! let layout = calculate_layout(11, &page, &TilingConfig::default());
//! assert_eq!(layout.font_size, 12.0);
//! assert_eq!((layout.spacing_x, layout.spacing_y), (122, 42));
//!
//! let tiles = calculate_tiled_positions(&page, &layout);
//! ```

use super::TilingConfig;
use serde::Serialize;

/// Largest page width or height accepted, in points (200 inches).
pub const MAX_PAGE_EXTENT: f64 = 14_400.0;

/// Size of a page in PDF points, with the lower-left corner of its MediaBox.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl PageDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    /// Build from a MediaBox `[llx, lly, urx, ury]`.
    ///
    /// Corners may be given in any order.
    pub fn from_media_box(media_box: [f64; 4]) -> Self {
        let [x0, y0, x1, y1] = media_box;
        Self {
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
            origin_x: x0.min(x1),
            origin_y: y0.min(y1),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// A page we can meaningfully tile.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A single baseline origin where the token is drawn, relative to the
/// MediaBox origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacementPosition {
    pub x: i64,
    pub y: i64,
}

impl PlacementPosition {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Font size and grid pitch for one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileLayout {
    pub font_size: f64,
    /// Estimated rendered width of the token in points.
    pub text_width: f64,
    pub spacing_x: i64,
    pub spacing_y: i64,
    pub min_repetitions_x: i64,
    pub min_repetitions_y: i64,
}

impl TileLayout {
    /// Number of tiles per row on `page`.
    pub fn columns(&self, page: &PageDimensions) -> usize {
        axis_steps(page.width, self.spacing_x).count()
    }

    /// Number of rows on `page`.
    pub fn rows(&self, page: &PageDimensions) -> usize {
        axis_steps(page.height, self.spacing_y).count()
    }
}

/// Scale the base font size by the square root of the page area ratio.
///
/// The result is truncated to a whole point size and clamped to
/// `[min_font_size, max_font_size]`.
pub fn calculate_font_size(page: &PageDimensions, tiling: &TilingConfig) -> f64 {
    let reference_area = tiling.reference_width * tiling.reference_height;
    let scale_factor = (page.area() / reference_area).sqrt();
    let font_size = (tiling.base_font_size * scale_factor).trunc();

    font_size.max(tiling.min_font_size).min(tiling.max_font_size)
}

/// Compute the grid pitch for a token of `token_chars` characters.
///
/// The pitch follows the text size but is capped so that at least
/// `max(min_columns, W / column_width)` tiles fit per row and
/// `max(min_rows, H / row_height)` rows fit per page.
pub fn calculate_spacing(
    token_chars: usize,
    font_size: f64,
    page: &PageDimensions,
    tiling: &TilingConfig,
) -> TileLayout {
    let char_width = font_size * tiling.char_width_ratio;
    let text_width = token_chars as f64 * char_width;

    let spacing_x = (text_width * tiling.horizontal_spacing_factor).trunc() as i64;
    let spacing_y = (font_size * tiling.vertical_spacing_factor).trunc() as i64;

    let min_repetitions_x =
        (tiling.min_columns as i64).max((page.width / tiling.column_width).trunc() as i64);
    let min_repetitions_y =
        (tiling.min_rows as i64).max((page.height / tiling.row_height).trunc() as i64);

    let spacing_x = spacing_x.min((page.width / min_repetitions_x as f64).trunc() as i64);
    let spacing_y = spacing_y.min((page.height / min_repetitions_y as f64).trunc() as i64);

    TileLayout {
        font_size,
        text_width,
        // A zero pitch would never advance.
        spacing_x: spacing_x.max(1),
        spacing_y: spacing_y.max(1),
        min_repetitions_x,
        min_repetitions_y,
    }
}

/// Font size and pitch for one page in one call.
pub fn calculate_layout(
    token_chars: usize,
    page: &PageDimensions,
    tiling: &TilingConfig,
) -> TileLayout {
    let font_size = calculate_font_size(page, tiling);
    calculate_spacing(token_chars, font_size, page, tiling)
}

/// Calculate the grid of token origins covering the page.
///
/// Rows and columns start one pitch before the page edge and stop one pitch
/// past it (exclusive), so partially visible tiles close the gaps at every
/// border. Positions are returned row by row, bottom to top.
pub fn calculate_tiled_positions(
    page: &PageDimensions,
    layout: &TileLayout,
) -> Vec<PlacementPosition> {
    let mut positions = Vec::with_capacity(layout.columns(page) * layout.rows(page));

    for y in axis_steps(page.height, layout.spacing_y) {
        for x in axis_steps(page.width, layout.spacing_x) {
            positions.push(PlacementPosition::new(x, y));
        }
    }

    positions
}

fn axis_steps(extent: f64, spacing: i64) -> impl Iterator<Item = i64> {
    let spacing = spacing.max(1);
    let start = -spacing;
    let end = extent.trunc() as i64 + spacing;
    (start..end).step_by(spacing as usize)
}
