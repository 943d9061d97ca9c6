//! Drawing callbacks for absolute-coordinate outlines
//!
//! Glyph outlines are replayed as a stream of segment events onto an
//! [`OutlinePen`]. Quadratic segments are raised to cubics before they reach
//! a pen, so every pen deals with lines and cubic curves only.

use kurbo::{Affine, Point};
use log::warn;

use crate::{FontSource, GlyphName};

/// Receiver of absolute-coordinate drawing events
pub trait OutlinePen {
    fn move_to(&mut self, pt: Point);

    fn line_to(&mut self, pt: Point);

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point);

    fn close_path(&mut self);

    fn end_path(&mut self) {}

    fn add_component(&mut self, _base: &GlyphName, _transform: Affine) {}
}

impl<P: OutlinePen + ?Sized> OutlinePen for &mut P {
    fn move_to(&mut self, pt: Point) {
        (**self).move_to(pt)
    }

    fn line_to(&mut self, pt: Point) {
        (**self).line_to(pt)
    }

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point) {
        (**self).curve_to(c1, c2, pt)
    }

    fn close_path(&mut self) {
        (**self).close_path()
    }

    fn end_path(&mut self) {
        (**self).end_path()
    }

    fn add_component(&mut self, base: &GlyphName, transform: Affine) {
        (**self).add_component(base, transform)
    }
}

/// A single recorded drawing event
#[derive(Debug, Clone, PartialEq)]
pub enum PenCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    ClosePath,
    EndPath,
    AddComponent(GlyphName, Affine),
}

/// Pen that stores every event it receives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingPen {
    pub commands: Vec<PenCommand>,
}

impl RecordingPen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay the recorded events onto another pen
    pub fn replay(&self, pen: &mut impl OutlinePen) {
        for command in &self.commands {
            match command {
                PenCommand::MoveTo(pt) => pen.move_to(*pt),
                PenCommand::LineTo(pt) => pen.line_to(*pt),
                PenCommand::CurveTo(c1, c2, pt) => pen.curve_to(*c1, *c2, *pt),
                PenCommand::ClosePath => pen.close_path(),
                PenCommand::EndPath => pen.end_path(),
                PenCommand::AddComponent(base, transform) => pen.add_component(base, *transform),
            }
        }
    }

    /// All on- and off-curve points in drawing order
    pub fn points(&self) -> Vec<Point> {
        self.commands
            .iter()
            .flat_map(|command| match command {
                PenCommand::MoveTo(pt) | PenCommand::LineTo(pt) => vec![*pt],
                PenCommand::CurveTo(c1, c2, pt) => vec![*c1, *c2, *pt],
                _ => Vec::new(),
            })
            .collect()
    }
}

impl OutlinePen for RecordingPen {
    fn move_to(&mut self, pt: Point) {
        self.commands.push(PenCommand::MoveTo(pt));
    }

    fn line_to(&mut self, pt: Point) {
        self.commands.push(PenCommand::LineTo(pt));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point) {
        self.commands.push(PenCommand::CurveTo(c1, c2, pt));
    }

    fn close_path(&mut self) {
        self.commands.push(PenCommand::ClosePath);
    }

    fn end_path(&mut self) {
        self.commands.push(PenCommand::EndPath);
    }

    fn add_component(&mut self, base: &GlyphName, transform: Affine) {
        self.commands
            .push(PenCommand::AddComponent(base.clone(), transform));
    }
}

/// Pen that applies an affine transform before forwarding events
pub struct TransformPen<P> {
    inner: P,
    transform: Affine,
}

impl<P: OutlinePen> TransformPen<P> {
    pub fn new(inner: P, transform: Affine) -> Self {
        Self { inner, transform }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: OutlinePen> OutlinePen for TransformPen<P> {
    fn move_to(&mut self, pt: Point) {
        self.inner.move_to(self.transform * pt);
    }

    fn line_to(&mut self, pt: Point) {
        self.inner.line_to(self.transform * pt);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point) {
        self.inner
            .curve_to(self.transform * c1, self.transform * c2, self.transform * pt);
    }

    fn close_path(&mut self) {
        self.inner.close_path();
    }

    fn end_path(&mut self) {
        self.inner.end_path();
    }

    fn add_component(&mut self, base: &GlyphName, transform: Affine) {
        self.inner.add_component(base, self.transform * transform);
    }
}

/// Pen that draws component references as outlines
///
/// Component bases are looked up in the font source and drawn through a
/// transformed copy of this pen, so nested components flatten too. A base
/// missing from the source, or one already being drawn further up the
/// component chain, is skipped with a warning.
pub struct DecomposingPen<'a, S: ?Sized, P> {
    source: &'a S,
    inner: P,
    stack: Vec<GlyphName>,
}

impl<'a, S: FontSource + ?Sized, P: OutlinePen> DecomposingPen<'a, S, P> {
    pub fn new(source: &'a S, inner: P) -> Self {
        Self {
            source,
            inner,
            stack: Vec::new(),
        }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<S: FontSource + ?Sized, P: OutlinePen> OutlinePen for DecomposingPen<'_, S, P> {
    fn move_to(&mut self, pt: Point) {
        self.inner.move_to(pt);
    }

    fn line_to(&mut self, pt: Point) {
        self.inner.line_to(pt);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point) {
        self.inner.curve_to(c1, c2, pt);
    }

    fn close_path(&mut self) {
        self.inner.close_path();
    }

    fn end_path(&mut self) {
        self.inner.end_path();
    }

    fn add_component(&mut self, base: &GlyphName, transform: Affine) {
        let mut flat = Flattening {
            source: self.source,
            inner: &mut self.inner,
            transform: Affine::IDENTITY,
            stack: &mut self.stack,
        };
        flat.add_component(base, transform);
    }
}

// Forwards transformed events to a type-erased pen so that nested components
// recurse through a single concrete pen type.
struct Flattening<'a, S: ?Sized> {
    source: &'a S,
    inner: &'a mut dyn OutlinePen,
    transform: Affine,
    stack: &'a mut Vec<GlyphName>,
}

impl<S: FontSource + ?Sized> OutlinePen for Flattening<'_, S> {
    fn move_to(&mut self, pt: Point) {
        self.inner.move_to(self.transform * pt);
    }

    fn line_to(&mut self, pt: Point) {
        self.inner.line_to(self.transform * pt);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point) {
        self.inner
            .curve_to(self.transform * c1, self.transform * c2, self.transform * pt);
    }

    fn close_path(&mut self) {
        self.inner.close_path();
    }

    fn end_path(&mut self) {
        self.inner.end_path();
    }

    fn add_component(&mut self, base: &GlyphName, transform: Affine) {
        let source = self.source;
        let Some(glyph) = source.component_glyph(base) else {
            warn!("component base glyph '{base}' not found; skipped");
            return;
        };
        if self.stack.contains(base) {
            warn!("component '{base}' references itself; skipped");
            return;
        }
        self.stack.push(base.clone());
        let mut nested = Flattening {
            source,
            inner: &mut *self.inner,
            transform: self.transform * transform,
            stack: &mut *self.stack,
        };
        glyph.draw(&mut nested);
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_pen_replay() {
        let mut pen = RecordingPen::new();
        pen.move_to(Point::new(0.0, 0.0));
        pen.line_to(Point::new(10.0, 0.0));
        pen.close_path();

        let mut copy = RecordingPen::new();
        pen.replay(&mut copy);
        assert_eq!(pen, copy);
        assert_eq!(copy.points().len(), 2);
    }

    #[test]
    fn test_transform_pen_translates() {
        let mut rec = RecordingPen::new();
        {
            let mut pen = TransformPen::new(&mut rec, Affine::translate((5.0, -5.0)));
            pen.move_to(Point::new(1.0, 1.0));
            pen.curve_to(
                Point::new(2.0, 2.0),
                Point::new(3.0, 3.0),
                Point::new(4.0, 4.0),
            );
            pen.end_path();
        }
        assert_eq!(
            rec.commands,
            vec![
                PenCommand::MoveTo(Point::new(6.0, -4.0)),
                PenCommand::CurveTo(
                    Point::new(7.0, -3.0),
                    Point::new(8.0, -2.0),
                    Point::new(9.0, -1.0)
                ),
                PenCommand::EndPath,
            ]
        );
    }

    #[test]
    fn test_transform_pen_composes_component_transform() {
        let mut rec = RecordingPen::new();
        let mut pen = TransformPen::new(&mut rec, Affine::translate((10.0, 0.0)));
        pen.add_component(&"a".into(), Affine::translate((0.0, 20.0)));
        assert_eq!(
            rec.commands,
            vec![PenCommand::AddComponent(
                "a".into(),
                Affine::translate((10.0, 20.0))
            )]
        );
    }
}
