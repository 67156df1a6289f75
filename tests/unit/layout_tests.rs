// Page layout tests through the public API

use docmark::watermark::{
    calculate_font_size, calculate_layout, calculate_spacing, calculate_tiled_positions,
    PageDimensions, TilingConfig,
};
use rstest::rstest;

const TOKEN_CHARS: usize = 11;

fn tiling() -> TilingConfig {
    TilingConfig::default()
}

#[rstest]
#[case::letter(612.0, 792.0, 12.0)]
#[case::a4(595.0, 842.0, 12.0)]
#[case::double_letter(1224.0, 1584.0, 20.0)]
#[case::half_letter(306.0, 396.0, 8.0)]
#[case::a0(2384.0, 3370.0, 20.0)]
fn test_font_size(#[case] width: f64, #[case] height: f64, #[case] expected: f64) {
    let page = PageDimensions::new(width, height);
    assert_eq!(calculate_font_size(&page, &tiling()), expected);
}

#[test]
fn test_letter_spacing() {
    let page = PageDimensions::new(612.0, 792.0);
    let layout = calculate_spacing(TOKEN_CHARS, 12.0, &page, &tiling());

    assert!((layout.text_width - 79.2).abs() < 1e-9);
    assert_eq!(layout.spacing_x, 122);
    assert_eq!(layout.spacing_y, 42);
    assert_eq!(layout.min_repetitions_x, 5);
    assert_eq!(layout.min_repetitions_y, 9);
}

#[test]
fn test_spacing_capped_by_minimum_repetitions() {
    // Narrow strip: the text-derived pitch would leave fewer than 5 columns.
    let page = PageDimensions::new(300.0, 792.0);
    let layout = calculate_spacing(TOKEN_CHARS, 12.0, &page, &tiling());
    assert_eq!(layout.spacing_x, 60);
}

#[test]
fn test_letter_grid() {
    let page = PageDimensions::new(612.0, 792.0);
    let layout = calculate_layout(TOKEN_CHARS, &page, &tiling());
    let positions = calculate_tiled_positions(&page, &layout);

    assert_eq!(positions.len(), 7 * 21);
    assert_eq!((positions[0].x, positions[0].y), (-122, -42));
    let last = positions.last().unwrap();
    assert_eq!((last.x, last.y), (610, 798));
}

#[test]
fn test_grid_is_row_major() {
    let page = PageDimensions::new(612.0, 792.0);
    let layout = calculate_layout(TOKEN_CHARS, &page, &tiling());
    let positions = calculate_tiled_positions(&page, &layout);

    let first_row: Vec<_> = positions.iter().take(7).collect();
    assert!(first_row.iter().all(|p| p.y == -42));
    assert_eq!(positions[7].y, 0);
}

#[rstest]
#[case(612.0, 792.0)]
#[case(2384.0, 3370.0)]
#[case(200.0, 200.0)]
#[case(4000.0, 300.0)]
fn test_minimum_density_holds(#[case] width: f64, #[case] height: f64) {
    let page = PageDimensions::new(width, height);
    let layout = calculate_layout(TOKEN_CHARS, &page, &tiling());

    // Columns and rows inside the page, not counting the border tiles
    let inside_x = (width as i64 + layout.spacing_x - 1) / layout.spacing_x;
    let inside_y = (height as i64 + layout.spacing_y - 1) / layout.spacing_y;
    assert!(inside_x >= layout.min_repetitions_x);
    assert!(inside_y >= layout.min_repetitions_y);
}

#[test]
fn test_tiny_page_still_terminates() {
    let page = PageDimensions::new(2.0, 3.0);
    let layout = calculate_layout(TOKEN_CHARS, &page, &tiling());

    assert_eq!(layout.spacing_x, 1);
    assert_eq!(layout.spacing_y, 1);
    assert!(!calculate_tiled_positions(&page, &layout).is_empty());
}

#[test]
fn test_custom_spacing_factors() {
    let tiling = TilingConfig {
        horizontal_spacing_factor: 1.5,
        vertical_spacing_factor: 2.0,
        ..TilingConfig::default()
    };
    let page = PageDimensions::new(612.0, 792.0);
    let layout = calculate_layout(TOKEN_CHARS, &page, &tiling);

    assert_eq!(layout.spacing_x, 118);
    assert_eq!(layout.spacing_y, 24);
}
