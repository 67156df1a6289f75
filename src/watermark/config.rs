//! Watermark configuration types.
//!
//! This module defines the tuning knobs of the tiling engine:
//! - How the identifier is masked
//! - How font size and tile spacing scale with the page
//! - How the overlay text is styled
//!
//! Every field has a default, so an empty `watermark:` section (or none at
//! all) reproduces the stock layout: 12pt Helvetica at letter size, 60% gray
//! at 60% opacity, `3 + XXXXXX + 2` masking.

use serde::{Deserialize, Serialize};

// Default values
fn default_keep_prefix() -> usize {
    3
}

fn default_keep_suffix() -> usize {
    2
}

fn default_mask() -> String {
    "XXXXXX".to_string()
}

fn default_min_digits() -> usize {
    11
}

fn default_base_font_size() -> f64 {
    12.0
}

fn default_reference_width() -> f64 {
    612.0
}

fn default_reference_height() -> f64 {
    792.0
}

fn default_min_font_size() -> f64 {
    8.0
}

fn default_max_font_size() -> f64 {
    20.0
}

fn default_char_width_ratio() -> f64 {
    0.6
}

fn default_horizontal_spacing_factor() -> f64 {
    2.5
}

fn default_vertical_spacing_factor() -> f64 {
    3.5
}

fn default_min_columns() -> u32 {
    5
}

fn default_min_rows() -> u32 {
    8
}

fn default_column_width() -> f64 {
    150.0
}

fn default_row_height() -> f64 {
    80.0
}

fn default_color() -> String {
    "#999999".to_string()
}

fn default_opacity() -> f32 {
    0.6
}

fn default_font() -> String {
    "Helvetica".to_string()
}

/// The 14 standard Type1 fonts every PDF viewer ships with.
pub const STANDARD_FONTS: &[&str] = &[
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

/// How the raw identifier is reduced to the watermark token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Leading digits kept verbatim (default: 3)
    #[serde(default = "default_keep_prefix")]
    pub keep_prefix: usize,

    /// Trailing digits kept verbatim (default: 2)
    #[serde(default = "default_keep_suffix")]
    pub keep_suffix: usize,

    /// Literal replacing the middle digits (default: "XXXXXX")
    #[serde(default = "default_mask")]
    pub mask: String,

    /// Minimum digits required after stripping non-digits (default: 11)
    #[serde(default = "default_min_digits")]
    pub min_digits: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            keep_prefix: default_keep_prefix(),
            keep_suffix: default_keep_suffix(),
            mask: default_mask(),
            min_digits: default_min_digits(),
        }
    }
}

/// Page-relative sizing and spacing of the tile grid.
///
/// Font size scales with the square root of the page area relative to the
/// reference page, then is clamped to `[min_font_size, max_font_size]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Font size at the reference page size in points (default: 12)
    #[serde(default = "default_base_font_size")]
    pub base_font_size: f64,

    /// Reference page width in points (default: 612, US letter)
    #[serde(default = "default_reference_width")]
    pub reference_width: f64,

    /// Reference page height in points (default: 792, US letter)
    #[serde(default = "default_reference_height")]
    pub reference_height: f64,

    #[serde(default = "default_min_font_size")]
    pub min_font_size: f64,

    #[serde(default = "default_max_font_size")]
    pub max_font_size: f64,

    /// Estimated glyph advance as a fraction of the font size (default: 0.6)
    #[serde(default = "default_char_width_ratio")]
    pub char_width_ratio: f64,

    /// Horizontal pitch as a multiple of the text width (default: 2.5)
    #[serde(default = "default_horizontal_spacing_factor")]
    pub horizontal_spacing_factor: f64,

    /// Vertical pitch as a multiple of the font size (default: 3.5)
    #[serde(default = "default_vertical_spacing_factor")]
    pub vertical_spacing_factor: f64,

    /// Minimum tiles per row (default: 5)
    #[serde(default = "default_min_columns")]
    pub min_columns: u32,

    /// Minimum rows per page (default: 8)
    #[serde(default = "default_min_rows")]
    pub min_rows: u32,

    /// Page width per additional required column (default: 150)
    #[serde(default = "default_column_width")]
    pub column_width: f64,

    /// Page height per additional required row (default: 80)
    #[serde(default = "default_row_height")]
    pub row_height: f64,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            base_font_size: default_base_font_size(),
            reference_width: default_reference_width(),
            reference_height: default_reference_height(),
            min_font_size: default_min_font_size(),
            max_font_size: default_max_font_size(),
            char_width_ratio: default_char_width_ratio(),
            horizontal_spacing_factor: default_horizontal_spacing_factor(),
            vertical_spacing_factor: default_vertical_spacing_factor(),
            min_columns: default_min_columns(),
            min_rows: default_min_rows(),
            column_width: default_column_width(),
            row_height: default_row_height(),
        }
    }
}

/// Appearance of the overlay text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Fill color as hex string (default: "#999999", 60% gray)
    #[serde(default = "default_color")]
    pub color: String,

    /// Opacity from 0.0 (transparent) to 1.0 (opaque) (default: 0.6)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// One of the 14 standard PDF fonts (default: "Helvetica")
    #[serde(default = "default_font")]
    pub font: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            opacity: default_opacity(),
            font: default_font(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default)]
    pub mask: MaskConfig,

    #[serde(default)]
    pub tiling: TilingConfig,

    #[serde(default)]
    pub style: StyleConfig,
}

impl MaskConfig {
    /// Validate the masking rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.mask.is_empty() {
            return Err("Mask literal cannot be empty".to_string());
        }

        // Drawn with a standard font in WinAnsiEncoding
        if !self.mask.chars().all(|c| c.is_ascii_graphic()) {
            return Err(format!(
                "Mask literal must be printable ASCII without spaces, got '{}'",
                self.mask
            ));
        }

        if self.keep_prefix + self.keep_suffix > self.min_digits {
            return Err(format!(
                "Mask keeps {} + {} digits but only {} are required",
                self.keep_prefix, self.keep_suffix, self.min_digits
            ));
        }

        Ok(())
    }
}

impl TilingConfig {
    /// Validate the tiling parameters.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("base_font_size", self.base_font_size),
            ("reference_width", self.reference_width),
            ("reference_height", self.reference_height),
            ("min_font_size", self.min_font_size),
            ("max_font_size", self.max_font_size),
            ("char_width_ratio", self.char_width_ratio),
            ("horizontal_spacing_factor", self.horizontal_spacing_factor),
            ("vertical_spacing_factor", self.vertical_spacing_factor),
            ("column_width", self.column_width),
            ("row_height", self.row_height),
        ];

        // Check for NaN/Infinity and sign
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "Tiling '{}' must be a finite positive number, got {}",
                    name, value
                ));
            }
        }

        if self.min_font_size > self.max_font_size {
            return Err(format!(
                "Tiling min_font_size ({}) exceeds max_font_size ({})",
                self.min_font_size, self.max_font_size
            ));
        }

        if self.min_columns == 0 || self.min_rows == 0 {
            return Err("Tiling min_columns and min_rows must be at least 1".to_string());
        }

        Ok(())
    }
}

impl StyleConfig {
    /// Validate the overlay style.
    pub fn validate(&self) -> Result<(), String> {
        // Check for NaN/Infinity and valid range
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(format!(
                "Watermark opacity must be a finite value between 0.0 and 1.0, got {}",
                self.opacity
            ));
        }

        // Validate hex color format (#RGB or #RRGGBB)
        if let Some(hex_part) = self.color.strip_prefix('#') {
            let len = hex_part.len();
            if (len != 3 && len != 6) || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!(
                    "Watermark color must be in #RGB or #RRGGBB format with valid hex characters, got '{}'",
                    self.color
                ));
            }
        } else {
            return Err(format!(
                "Watermark color must be a hex string starting with '#', got '{}'",
                self.color
            ));
        }

        if !STANDARD_FONTS.contains(&self.font.as_str()) {
            return Err(format!(
                "Watermark font must be one of the standard PDF fonts {:?}, got '{}'",
                STANDARD_FONTS, self.font
            ));
        }

        Ok(())
    }
}

impl WatermarkConfig {
    /// Validate the whole watermark configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.mask.validate().map_err(|e| format!("mask: {}", e))?;
        self.tiling.validate().map_err(|e| format!("tiling: {}", e))?;
        self.style.validate().map_err(|e| format!("style: {}", e))?;
        Ok(())
    }
}
