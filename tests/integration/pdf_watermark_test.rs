//! End-to-end watermarking tests.
//!
//! Builds real PDFs in memory, stamps them through the public API and
//! decodes the output to check page count, geometry and overlay content.
//!
//! Run with:
//!   cargo test --test integration_tests pdf_watermark

use super::test_harness::*;
use docmark::watermark::{
    add_watermark_to_pdf, WatermarkConfig, WatermarkError, WatermarkProcessor,
};
use rstest::rstest;

fn processor() -> WatermarkProcessor {
    WatermarkProcessor::new(WatermarkConfig::default()).expect("default config is valid")
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(50)]
fn test_page_count_is_preserved(#[case] pages: usize) {
    let source = build_letter_pdf(pages);
    let stamped = processor().watermark_bytes(&source, CPF).unwrap();

    assert_eq!(stamped.page_count, pages);
    assert_eq!(inspect(&stamped.bytes).len(), pages);
}

#[test]
fn test_every_page_carries_the_masked_token() {
    let source = build_letter_pdf(3);
    let stamped = processor().watermark_bytes(&source, CPF).unwrap();
    assert_eq!(stamped.token, TOKEN);

    for page in inspect(&stamped.bytes) {
        // Letter: 7 columns x 21 rows
        assert_eq!(page.tile_count(TOKEN), 7 * 21);
        let shown = page.shown_text();
        assert!(
            !shown.iter().any(|s| s.contains("45678")),
            "raw identifier digits leaked into the page"
        );
    }
}

#[test]
fn test_original_content_is_kept_beneath_overlay() {
    let source = build_letter_pdf(2);
    let stamped = processor().watermark_bytes(&source, CPF).unwrap();

    for (index, page) in inspect(&stamped.bytes).iter().enumerate() {
        let shown = page.shown_text();
        let original = format!("Pagina {}", index + 1);
        let original_at = shown.iter().position(|s| *s == original).unwrap();
        let first_tile = shown.iter().position(|s| s == TOKEN).unwrap();
        assert!(original_at < first_tile, "overlay must be drawn last");

        // Original text state is closed before the overlay starts.
        let operators: Vec<&str> = page.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators.first(), Some(&"q"));
        assert_eq!(operators.last(), Some(&"Q"));
    }
}

#[test]
fn test_page_dimensions_are_preserved() {
    let sizes = [LETTER, A4, LEGAL, TABLOID_X2];
    let stamped = processor().watermark_bytes(&build_pdf(&sizes), CPF).unwrap();

    let pages = inspect(&stamped.bytes);
    for (page, (width, height)) in pages.iter().zip(sizes) {
        assert!((page.width - width).abs() < 0.01);
        assert!((page.height - height).abs() < 0.01);
    }
}

#[test]
fn test_font_size_follows_each_page() {
    let sizes = [LETTER, TABLOID_X2, (297.6, 419.5)];
    let stamped = processor().watermark_bytes(&build_pdf(&sizes), CPF).unwrap();

    let overlay_sizes: Vec<f64> = inspect(&stamped.bytes)
        .iter()
        // The last Tf on each page belongs to the overlay.
        .map(|page| *page.font_sizes().last().unwrap())
        .collect();
    assert_eq!(overlay_sizes, [12.0, 20.0, 8.0]);
}

#[test]
fn test_tiles_cover_every_edge() {
    let stamped = processor().watermark_bytes(&build_letter_pdf(1), CPF).unwrap();
    let page = &inspect(&stamped.bytes)[0];
    // Source pages position their text with Td, so every Tm is a tile.
    let tiles = page.text_origins();

    assert!(tiles.iter().any(|(x, _)| *x < 0.0));
    assert!(tiles.iter().any(|(_, y)| *y < 0.0));
    assert!(tiles.iter().any(|(x, _)| *x >= 612.0 - 122.0));
    assert!(tiles.iter().any(|(_, y)| *y >= 792.0 - 42.0));
}

#[test]
fn test_watermarking_is_deterministic() {
    let source = build_pdf(&[LETTER, A4]);
    let first = processor().watermark_bytes(&source, CPF).unwrap();
    let second = processor().watermark_bytes(&source, CPF).unwrap();

    let first_pages = inspect(&first.bytes);
    let second_pages = inspect(&second.bytes);
    for (a, b) in first_pages.iter().zip(&second_pages) {
        assert_eq!(a.font_sizes(), b.font_sizes());
        assert_eq!(a.text_origins(), b.text_origins());
    }

    let plan_a = processor().plan_bytes(&source, CPF).unwrap();
    let plan_b = processor().plan_bytes(&source, CPF).unwrap();
    for (a, b) in plan_a.iter().zip(&plan_b) {
        assert_eq!(a.layout, b.layout);
    }
}

#[test]
fn test_short_identifier_produces_no_output() {
    let err = processor()
        .watermark_bytes(&build_letter_pdf(1), "abc123")
        .unwrap_err();
    assert!(matches!(
        err,
        WatermarkError::InvalidIdentifier {
            required: 11,
            found: 3
        }
    ));
}

#[test]
fn test_file_api_leaves_source_untouched() {
    let source = build_letter_pdf(2);
    let file = write_temp_pdf(&source);

    let stamped = processor().watermark_file(file.path(), CPF).unwrap();
    assert_eq!(stamped.page_count, 2);
    assert_eq!(std::fs::read(file.path()).unwrap(), source);
}

#[test]
fn test_add_watermark_to_pdf_returns_bytes_or_none() {
    let file = write_temp_pdf(&build_letter_pdf(1));

    let bytes = add_watermark_to_pdf(file.path(), CPF).expect("watermarked bytes");
    assert_eq!(inspect(&bytes).len(), 1);

    assert!(add_watermark_to_pdf(file.path(), "abc123").is_none());
    assert!(add_watermark_to_pdf("/nonexistent/relatorio.pdf", CPF).is_none());
}

#[test]
fn test_plan_reports_density_per_page() {
    let sizes = [LETTER, (2384.0, 3370.0)];
    let plan = processor().plan_bytes(&build_pdf(&sizes), CPF).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].page, 1);
    assert_eq!(plan[0].layout.font_size, 12.0);
    assert_eq!((plan[0].columns, plan[0].rows), (7, 21));
    assert_eq!(plan[0].tiles, 147);

    assert_eq!(plan[1].layout.font_size, 20.0);
    assert!(plan[1].columns >= 15);
    assert!(plan[1].rows >= 42);
}

#[test]
fn test_custom_style_is_applied() {
    let mut config = WatermarkConfig::default();
    config.style.font = "Courier-Bold".to_string();
    config.mask.mask = "******".to_string();

    let stamped = WatermarkProcessor::new(config)
        .unwrap()
        .watermark_bytes(&build_letter_pdf(1), CPF)
        .unwrap();
    assert_eq!(stamped.token, "123******09");
    assert!(inspect(&stamped.bytes)[0].tile_count("123******09") > 0);
}
