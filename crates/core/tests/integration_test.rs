//! Integration tests for drawing, decomposition and font-wide lookups

use kurbo::{Affine, Point};
use ufo2ot_core::{
    Component, Contour, ContourPoint, DecomposingPen, Font, FontSource, Glyph, PenCommand,
    PointType, RecordingPen, check_component_cycles, official_glyph_order, unicode_to_glyph_map,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn square(x: f64, y: f64, size: f64) -> Contour {
    Contour::new(vec![
        ContourPoint::new(x, y, PointType::Line),
        ContourPoint::new(x + size, y, PointType::Line),
        ContourPoint::new(x + size, y + size, PointType::Line),
        ContourPoint::new(x, y + size, PointType::Line),
    ])
}

fn composite_font() -> Font {
    let mut font = Font::new()
        .with_glyph(Glyph::new("dot").with_contour(square(0.0, 0.0, 10.0)))
        .with_glyph(
            Glyph::new("colon")
                .with_component(Component::offset("dot", 0.0, 0.0))
                .with_component(Component::offset("dot", 0.0, 100.0)),
        )
        .with_glyph(
            Glyph::new("colon.wide").with_component(Component::new("colon", Affine::scale(2.0))),
        );
    font.set_glyph_order(["dot", "colon", "colon.wide"]);
    font
}

// ============================================================================
// Decomposition
// ============================================================================

#[test]
fn test_decompose_nested_components() {
    init_logger();
    let font = composite_font();
    let glyph = font.glyph("colon.wide").unwrap();

    let mut pen = DecomposingPen::new(&font, RecordingPen::new());
    glyph.draw(&mut pen);
    let rec = pen.into_inner();

    let moves: Vec<Point> = rec
        .commands
        .iter()
        .filter_map(|c| match c {
            PenCommand::MoveTo(pt) => Some(*pt),
            _ => None,
        })
        .collect();
    assert_eq!(moves, vec![Point::new(0.0, 0.0), Point::new(0.0, 200.0)]);
    assert!(
        !rec.commands
            .iter()
            .any(|c| matches!(c, PenCommand::AddComponent(..)))
    );
    assert!(rec.points().contains(&Point::new(20.0, 220.0)));
}

#[test]
fn test_decompose_skips_missing_base() {
    init_logger();
    let font = Font::new().with_glyph(
        Glyph::new("a")
            .with_contour(square(0.0, 0.0, 5.0))
            .with_component(Component::offset("ghost", 0.0, 0.0)),
    );
    let mut pen = DecomposingPen::new(&font, RecordingPen::new());
    font.glyph("a").unwrap().draw(&mut pen);
    assert_eq!(pen.into_inner().commands.len(), 5);
}

#[test]
fn test_decompose_through_export_view_keeps_hidden_bases() {
    let mut font = composite_font();
    font.set_skip_export(["dot"]);
    let view = font.export_view();
    assert!(!view.contains("dot"));

    let mut pen = DecomposingPen::new(&view, RecordingPen::new());
    view.glyph("colon").unwrap().draw(&mut pen);
    assert_eq!(pen.into_inner().points().len(), 8);
}

// ============================================================================
// Font-wide lookups
// ============================================================================

#[test]
fn test_glyph_order_and_cmap_over_view() {
    let mut font = Font::new()
        .with_glyph(Glyph::new(".notdef"))
        .with_glyph(Glyph::new("a").with_codepoint('a'))
        .with_glyph(Glyph::new("a.draft").with_codepoint('a'));
    font.set_skip_export(["a.draft"]);

    assert!(unicode_to_glyph_map(&font).is_err());

    let view = font.export_view();
    let cmap = unicode_to_glyph_map(&view).unwrap();
    assert_eq!(cmap.values().map(|n| n.as_str()).collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(official_glyph_order(&view).len(), 2);
}

#[test]
fn test_cycle_check_on_composites() {
    let mut font = composite_font();
    assert!(check_component_cycles(&font).is_ok());

    font.glyph_mut("dot")
        .unwrap()
        .components
        .push(Component::offset("colon.wide", 0.0, 0.0));
    let err = check_component_cycles(&font).unwrap_err();
    assert!(err.is_invalid_font_data());
    assert!(err.to_string().contains("dot"));
}
