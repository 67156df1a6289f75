//! Text watermark rendering.
//!
//! This module turns a tile layout into a PDF content stream that draws the
//! masked token at every grid position.
//!
//! # Features
//!
//! - Hex color parsing (#RGB and #RRGGBB formats)
//! - Transparency through an `ExtGState` resource
//! - One text object per page, one `Tm`/`Tj` pair per tile
//!
//! The emitted stream is self-contained: it saves and restores the graphics
//! state, so it can be appended after any existing page content.

use super::position::{PageDimensions, PlacementPosition};
use super::WatermarkError;
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Parsed RGB color from hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to the `0.0..=1.0` range PDF operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Options for rendering the overlay of one page.
#[derive(Debug, Clone)]
pub struct TextRenderOptions<'a> {
    /// The text drawn at every tile.
    pub text: &'a str,
    /// Font size in points.
    pub font_size: f64,
    /// Fill color.
    pub color: Color,
    /// Page resource name of the font (without the leading slash).
    pub font_resource: &'a str,
    /// Page resource name of the transparency state.
    pub graphics_state_resource: &'a str,
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
///
/// # Examples
///
/// ```ignore
/// let gray = parse_hex_color("#999999").unwrap();
/// assert_eq!(gray, Color::new(153, 153, 153));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let hex = hex
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::Config("Color must start with '#'".to_string()))?;

    if !hex.is_ascii() {
        return Err(WatermarkError::Config("Invalid hex digit".to_string()));
    }

    let component = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| WatermarkError::Config("Invalid hex digit".to_string()))
    };

    match hex.len() {
        3 => {
            // #RGB format - each digit is doubled: 0xF -> 0xFF, 0xA -> 0xAA
            let r = component(&hex[0..1])?;
            let g = component(&hex[1..2])?;
            let b = component(&hex[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            component(&hex[0..2])?,
            component(&hex[2..4])?,
            component(&hex[4..6])?,
        )),
        _ => Err(WatermarkError::Config(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            hex.len()
        ))),
    }
}

/// Build the content-stream operations drawing `options.text` at every
/// position.
///
/// Positions are relative to the MediaBox origin of `page`.
pub fn render_operations(
    options: &TextRenderOptions<'_>,
    page: &PageDimensions,
    positions: &[PlacementPosition],
) -> Vec<Operation> {
    let [r, g, b] = options.color.to_unit();
    let mut operations = Vec::with_capacity(positions.len() * 2 + 7);

    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new(
        "gs",
        vec![Object::Name(
            options.graphics_state_resource.as_bytes().to_vec(),
        )],
    ));
    operations.push(Operation::new(
        "rg",
        vec![Object::Real(r), Object::Real(g), Object::Real(b)],
    ));
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![
            Object::Name(options.font_resource.as_bytes().to_vec()),
            Object::Real(options.font_size as f32),
        ],
    ));

    for position in positions {
        let x = position.x as f64 + page.origin_x;
        let y = position.y as f64 + page.origin_y;
        operations.push(Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Real(x as f32),
                Object::Real(y as f32),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                options.text.as_bytes().to_vec(),
                StringFormat::Literal,
            )],
        ));
    }

    operations.push(Operation::new("ET", vec![]));
    operations.push(Operation::new("Q", vec![]));
    operations
}

/// Render the overlay for one page as encoded content-stream bytes.
pub fn render_text(
    options: &TextRenderOptions<'_>,
    page: &PageDimensions,
    positions: &[PlacementPosition],
) -> Result<Vec<u8>, WatermarkError> {
    let content = Content {
        operations: render_operations(options, page, positions),
    };
    content
        .encode()
        .map_err(|e| WatermarkError::Serialize(e.to_string()))
}
