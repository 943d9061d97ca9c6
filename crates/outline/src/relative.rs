//! Absolute to relative coordinate conversion
//!
//! [`RelativeCoordinatePen`] receives absolute drawing events and hands the
//! deltas between consecutive points to a [`RelativeEncoder`]. Each encoder
//! decides how a delta is spelled (charstring operators, bez tokens, ...);
//! the pen owns the bookkeeping common to all of them:
//!
//! - the previous absolute point starts out unset, so the very first point
//!   is passed through as an offset from the origin
//! - curve control points chain, each relative to the point before it
//! - a move is held until a line or curve proves its subpath non-empty, so
//!   moves that are never followed by drawing produce nothing

use kurbo::{Point, Vec2};
use ufo2ot_core::OutlinePen;
use write_fonts::OtRound;

/// Encoding target for relative drawing events
pub trait RelativeEncoder {
    fn relative_move_to(&mut self, delta: Vec2);

    fn relative_line_to(&mut self, delta: Vec2);

    fn relative_curve_to(&mut self, d1: Vec2, d2: Vec2, d3: Vec2);

    fn close_path(&mut self) {}

    fn end_path(&mut self) {}
}

/// The move waiting for the first drawing command of its subpath
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum HeldMove {
    #[default]
    None,
    Pending(Point),
}

impl HeldMove {
    /// Replace any pending move with `pt`
    pub fn hold(&mut self, pt: Point) {
        *self = HeldMove::Pending(pt);
    }

    /// Take the pending move, leaving nothing held
    pub fn release(&mut self) -> Option<Point> {
        match std::mem::take(self) {
            HeldMove::Pending(pt) => Some(pt),
            HeldMove::None => None,
        }
    }
}

/// Round half up to the nearest integer
pub fn round_point(pt: Point) -> Point {
    Point::new(OtRound::<f64>::ot_round(pt.x), OtRound::<f64>::ot_round(pt.y))
}

/// Pen converting absolute coordinates into deltas for an encoder
///
/// Component references are not expanded here; wrap the pen in a
/// [`DecomposingPen`](ufo2ot_core::DecomposingPen) to draw composites.
#[derive(Debug, Clone)]
pub struct RelativeCoordinatePen<E> {
    encoder: E,
    last: Option<Point>,
    held: HeldMove,
    round: bool,
}

impl<E: RelativeEncoder> RelativeCoordinatePen<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            last: None,
            held: HeldMove::None,
            round: false,
        }
    }

    /// Round absolute points to integers before taking deltas
    pub fn rounded(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn held_move(&self) -> HeldMove {
        self.held
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn into_encoder(self) -> E {
        self.encoder
    }

    fn make_relative(&mut self, pt: Point) -> Vec2 {
        let pt = if self.round { round_point(pt) } else { pt };
        let delta = match self.last {
            Some(last) => pt - last,
            None => pt.to_vec2(),
        };
        self.last = Some(pt);
        delta
    }

    fn release_held_move(&mut self) {
        if let Some(pt) = self.held.release() {
            let delta = self.make_relative(pt);
            self.encoder.relative_move_to(delta);
        }
    }
}

impl<E: RelativeEncoder> OutlinePen for RelativeCoordinatePen<E> {
    fn move_to(&mut self, pt: Point) {
        self.held.hold(pt);
    }

    fn line_to(&mut self, pt: Point) {
        self.release_held_move();
        let delta = self.make_relative(pt);
        self.encoder.relative_line_to(delta);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, pt: Point) {
        self.release_held_move();
        let d1 = self.make_relative(c1);
        let d2 = self.make_relative(c2);
        let d3 = self.make_relative(pt);
        self.encoder.relative_curve_to(d1, d2, d3);
    }

    fn close_path(&mut self) {
        self.encoder.close_path();
    }

    fn end_path(&mut self) {
        self.encoder.end_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Log(Vec<String>);

    impl RelativeEncoder for Log {
        fn relative_move_to(&mut self, d: Vec2) {
            self.0.push(format!("M {} {}", d.x, d.y));
        }

        fn relative_line_to(&mut self, d: Vec2) {
            self.0.push(format!("L {} {}", d.x, d.y));
        }

        fn relative_curve_to(&mut self, d1: Vec2, d2: Vec2, d3: Vec2) {
            self.0.push(format!(
                "C {} {} {} {} {} {}",
                d1.x, d1.y, d2.x, d2.y, d3.x, d3.y
            ));
        }

        fn close_path(&mut self) {
            self.0.push("Z".into());
        }
    }

    fn pen() -> RelativeCoordinatePen<Log> {
        RelativeCoordinatePen::new(Log::default())
    }

    #[test]
    fn test_held_move_state_machine() {
        let mut held = HeldMove::default();
        assert_eq!(held.release(), None);
        held.hold(Point::new(1.0, 1.0));
        held.hold(Point::new(2.0, 2.0));
        assert_eq!(held, HeldMove::Pending(Point::new(2.0, 2.0)));
        assert_eq!(held.release(), Some(Point::new(2.0, 2.0)));
        assert_eq!(held, HeldMove::None);
    }

    #[test]
    fn test_first_point_is_absolute() {
        let mut pen = pen();
        pen.move_to(Point::new(10.0, 20.0));
        pen.line_to(Point::new(15.0, 20.0));
        assert_eq!(pen.into_encoder().0, vec!["M 10 20", "L 5 0"]);
    }

    #[test]
    fn test_curve_deltas_chain() {
        let mut pen = pen();
        pen.move_to(Point::new(0.0, 0.0));
        pen.curve_to(
            Point::new(10.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 30.0),
        );
        assert_eq!(pen.into_encoder().0, vec!["M 0 0", "C 10 0 10 10 0 20"]);
    }

    #[test]
    fn test_move_then_close_emits_nothing_but_close() {
        let mut pen = pen();
        pen.move_to(Point::new(5.0, 5.0));
        pen.close_path();
        let log = pen.into_encoder();
        assert_eq!(log.0, vec!["Z"]);
    }

    #[test]
    fn test_consecutive_moves_keep_latest() {
        let mut pen = pen();
        pen.move_to(Point::new(5.0, 5.0));
        pen.move_to(Point::new(7.0, 9.0));
        pen.line_to(Point::new(8.0, 9.0));
        assert_eq!(pen.into_encoder().0, vec!["M 7 9", "L 1 0"]);
    }

    #[test]
    fn test_delta_state_persists_across_subpaths() {
        let mut pen = pen();
        pen.move_to(Point::new(0.0, 0.0));
        pen.line_to(Point::new(10.0, 0.0));
        pen.close_path();
        pen.move_to(Point::new(50.0, 50.0));
        pen.line_to(Point::new(50.0, 60.0));
        assert_eq!(
            pen.into_encoder().0,
            vec!["M 0 0", "L 10 0", "Z", "M 40 50", "L 0 10"]
        );
    }

    #[test]
    fn test_rounding_happens_before_deltas() {
        let mut pen = pen().rounded(true);
        pen.move_to(Point::new(0.4, 0.5));
        pen.line_to(Point::new(1.4, 1.5));
        pen.line_to(Point::new(2.4, 2.5));
        assert_eq!(pen.into_encoder().0, vec!["M 0 1", "L 1 1", "L 1 1"]);
    }
}
