//! Integration tests for charstring and bez compilation

use kurbo::Point;
use ufo2ot_core::{
    Component, Contour, ContourPoint, Font, FontSource, Glyph, OutlinePen, PenCommand,
    PointType, RecordingPen,
};
use ufo2ot_outline::{
    BezEncoder, CharstringCompiler, CompileOptions, Error, Operator, compile_charstring,
    compile_charstrings, draw_bez, encode_bez,
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

fn bowl() -> Contour {
    Contour::new(vec![
        ContourPoint::new(100.0, 0.0, PointType::Line),
        ContourPoint::new(155.2, 0.0, PointType::OffCurve),
        ContourPoint::new(200.0, 44.8, PointType::OffCurve),
        ContourPoint::new(200.0, 100.0, PointType::Curve),
        ContourPoint::new(200.0, 155.2, PointType::OffCurve),
        ContourPoint::new(155.2, 200.0, PointType::OffCurve),
        ContourPoint::new(100.0, 200.0, PointType::Curve),
    ])
}

fn sample_font() -> Font {
    let mut font = Font::new()
        .with_glyph(Glyph::new(".notdef").with_width(500.0))
        .with_glyph(
            Glyph::new("dot")
                .with_width(200.0)
                .with_contour(square(50.0, 0.0, 100.0)),
        )
        .with_glyph(
            Glyph::new("colon")
                .with_width(200.0)
                .with_component(Component::offset("dot", 0.0, 0.0))
                .with_component(Component::offset("dot", 0.0, 400.0)),
        )
        .with_glyph(Glyph::new("D").with_width(600.0).with_contour(bowl()));
    font.set_glyph_order([".notdef", "dot", "colon", "D"]);
    font
}

fn absolute_points(commands: &[PenCommand]) -> Vec<Point> {
    let mut points = Vec::new();
    for command in commands {
        match command {
            PenCommand::MoveTo(p) | PenCommand::LineTo(p) => points.push(*p),
            PenCommand::CurveTo(a, b, c) => points.extend([*a, *b, *c]),
            _ => {}
        }
    }
    points
}

// ============================================================================
// Charstrings
// ============================================================================

#[test]
fn test_compile_is_deterministic() {
    init_logger();
    let font = sample_font();
    let options = CompileOptions::new();
    let first = compile_charstrings(&font, &options).unwrap();
    let second = compile_charstrings(&font, &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.keys().map(|n| n.as_str()).collect::<Vec<_>>(),
        vec![".notdef", "dot", "colon", "D"]
    );
}

#[test]
fn test_every_program_ends_with_endchar() {
    init_logger();
    let font = sample_font();
    let programs = compile_charstrings(&font, &CompileOptions::new()).unwrap();
    for program in programs.values() {
        let last = program.commands().last().unwrap();
        assert_eq!(last.operator, Operator::EndChar);
        assert_eq!(
            program
                .commands()
                .iter()
                .filter(|c| c.operator == Operator::EndChar)
                .count(),
            1
        );
    }
    // an empty glyph is its width and endchar
    assert_eq!(programs[".notdef"].to_string(), "500 endchar");
}

#[test]
fn test_width_is_present_only_when_not_default() {
    let font = sample_font();
    let options = CompileOptions::new().default_width(200.0);
    let programs = compile_charstrings(&font, &options).unwrap();
    assert_eq!(programs["dot"].width(), None);
    assert_eq!(programs["D"].width(), Some(600.0));
    assert!(programs["D"].to_string().starts_with("600 "));
}

#[test]
fn test_composite_is_decomposed() {
    let font = sample_font();
    let programs = compile_charstrings(&font, &CompileOptions::new()).unwrap();
    assert_eq!(
        programs["colon"].to_string(),
        "200 50 0 rmoveto 100 0 rlineto 0 100 rlineto -100 0 rlineto \
         0 300 rmoveto 100 0 rlineto 0 100 rlineto -100 0 rlineto endchar"
    );
}

#[test]
fn test_rounding_happens_before_deltas() {
    let font = sample_font();
    let glyph = font.glyph("D").unwrap();
    let program = compile_charstring(glyph, &font, None, &CompileOptions::new());
    let curve = &program.commands()[1];
    assert_eq!(curve.operator, Operator::RRCurveTo);
    // 155.2 -> 155 and 44.8 -> 45 before subtracting
    assert_eq!(curve.operands, vec![55.0, 0.0, 45.0, 45.0, 0.0, 55.0]);
}

#[test]
fn test_unrounded_program_keeps_fractions() {
    let mut pen = CharstringCompiler::pen(Some(500.5), false);
    pen.move_to(Point::new(0.5, 0.0));
    pen.line_to(Point::new(1.0, 0.25));
    let program = pen.into_encoder().finish();
    assert_eq!(program.width(), Some(500.5));
    assert_eq!(program.commands()[1].operands, vec![0.5, 0.25]);
    // fractional operands use the 16.16 fixed form
    assert_eq!(program.to_bytes()[0], 255);
}

#[test]
fn test_component_cycle_is_reported() {
    init_logger();
    let font = Font::new()
        .with_glyph(Glyph::new("a").with_component(Component::offset("b", 0.0, 0.0)))
        .with_glyph(Glyph::new("b").with_component(Component::offset("a", 0.0, 0.0)));
    let err = compile_charstrings(&font, &CompileOptions::new()).unwrap_err();
    match err {
        Error::Font(inner) => assert!(inner.is_invalid_font_data()),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Bez
// ============================================================================

#[test]
fn test_bez_round_trip_preserves_points() {
    init_logger();
    let font = sample_font();
    for name in ["dot", "colon", "D"] {
        let glyph = font.glyph(name).unwrap();
        let bez = encode_bez(glyph, &font);

        let mut decoded = RecordingPen::new();
        draw_bez(&bez, &mut decoded).unwrap();

        let mut expected = RecordingPen::new();
        let mut pen = ufo2ot_core::DecomposingPen::new(&font, &mut expected);
        glyph.draw(&mut pen);
        let rounded: Vec<Point> = absolute_points(&expected.commands)
            .into_iter()
            .map(ufo2ot_outline::round_point)
            .collect();

        assert_eq!(absolute_points(&decoded.commands), rounded, "glyph {name}");
    }
}

#[test]
fn test_bez_coalesces_empty_moves() {
    let mut pen = BezEncoder::pen();
    pen.move_to(Point::new(5.0, 5.0));
    pen.move_to(Point::new(10.0, 10.0));
    pen.line_to(Point::new(20.0, 10.0));
    pen.close_path();
    let bez = pen.encoder().to_bez();
    assert_eq!(bez, "sc\n10 10 rmt\n10 hdt\ncp\ned\n");
}

#[test]
fn test_bez_decode_then_encode_is_stable() {
    let source = "sc\n10 20 rmt\n100 hdt\n50 vdt\n0 50 -50 0 vhct\ncp\ned\n";
    let mut pen = BezEncoder::pen();
    draw_bez(source, &mut pen).unwrap();
    assert_eq!(pen.encoder().to_bez(), source);
}

#[test]
fn test_bez_unknown_token_stops_decoding() {
    let mut pen = RecordingPen::new();
    let err = draw_bez("0 0 rmt\n10 hdt\nbogus\n20 vdt\n", &mut pen).unwrap_err();
    assert!(matches!(err, Error::UnknownBezToken { line: 3, .. }));
    assert_eq!(pen.commands.len(), 2);
}
