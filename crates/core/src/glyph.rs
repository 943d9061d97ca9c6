//! Glyph records: contours of typed points, components and anchors

use kurbo::{Affine, Point, QuadBez};

use crate::{Anchor, Codepoint, GlyphName, OutlinePen};

/// How a contour point participates in its outline
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointType {
    /// First point of an open contour
    Move,
    Line,
    OffCurve,
    /// End of a cubic segment
    Curve,
    /// End of a quadratic segment
    QCurve,
}

impl PointType {
    pub fn is_on_curve(self) -> bool {
        self != PointType::OffCurve
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub typ: PointType,
    pub smooth: bool,
}

impl ContourPoint {
    pub fn new(x: f64, y: f64, typ: PointType) -> Self {
        Self {
            x,
            y,
            typ,
            smooth: false,
        }
    }

    pub fn smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<ContourPoint>,
}

impl Contour {
    pub fn new(points: Vec<ContourPoint>) -> Self {
        Self { points }
    }

    /// A contour is open when it starts with a `Move` point
    pub fn is_closed(&self) -> bool {
        self.points
            .first()
            .is_none_or(|point| point.typ != PointType::Move)
    }

    /// Replay this contour as segments
    ///
    /// Closed contours start at their first on-curve point and wrap around to
    /// it; the closing straight line is left implicit in `close_path`.
    pub fn draw(&self, pen: &mut impl OutlinePen) {
        let Some(first) = self.points.first() else {
            return;
        };

        if !self.is_closed() {
            pen.move_to(first.point());
            let mut segments = SegmentBuilder::new(first.point());
            for point in &self.points[1..] {
                segments.push(point, pen);
            }
            pen.end_path();
            return;
        }

        let (start, rotated): (Point, Vec<ContourPoint>) =
            match self.points.iter().position(|p| p.typ.is_on_curve()) {
                Some(idx) => {
                    let mut rotated = self.points[idx + 1..].to_vec();
                    rotated.extend_from_slice(&self.points[..=idx]);
                    (self.points[idx].point(), rotated)
                }
                // all off-curve quadratic contour: start on the implied point
                // between the last and first off-curve points
                None => {
                    let last = self.points[self.points.len() - 1].point();
                    let start = last.midpoint(first.point());
                    let mut rotated = self.points.clone();
                    rotated.push(ContourPoint::new(start.x, start.y, PointType::QCurve));
                    (start, rotated)
                }
            };

        pen.move_to(start);
        let mut segments = SegmentBuilder::new(start);
        let last = rotated.len() - 1;
        for (idx, point) in rotated.iter().enumerate() {
            if idx == last && point.typ == PointType::Line {
                break;
            }
            segments.push(point, pen);
        }
        pen.close_path();
    }
}

// Accumulates off-curve points until an on-curve point ends the segment.
struct SegmentBuilder {
    current: Point,
    pending: Vec<Point>,
}

impl SegmentBuilder {
    fn new(start: Point) -> Self {
        Self {
            current: start,
            pending: Vec::new(),
        }
    }

    fn push(&mut self, point: &ContourPoint, pen: &mut impl OutlinePen) {
        let pt = point.point();
        if point.typ == PointType::OffCurve {
            self.pending.push(pt);
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        match (point.typ, pending.as_slice()) {
            (PointType::Curve, [c]) => self.quad(*c, pt, pen),
            (PointType::Curve, [.., c1, c2]) => pen.curve_to(*c1, *c2, pt),
            (PointType::QCurve, [_, ..]) => {
                for (idx, c) in pending.iter().enumerate() {
                    let end = pending.get(idx + 1).map_or(pt, |next| c.midpoint(*next));
                    self.quad(*c, end, pen);
                }
            }
            _ => pen.line_to(pt),
        }
        self.current = pt;
    }

    fn quad(&mut self, control: Point, end: Point, pen: &mut impl OutlinePen) {
        let cubic = QuadBez::new(self.current, control, end).raise();
        pen.curve_to(cubic.p1, cubic.p2, cubic.p3);
        self.current = end;
    }
}

/// A reference to another glyph drawn with an affine transform
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub base: GlyphName,
    pub transform: Affine,
}

impl Component {
    pub fn new(base: impl Into<GlyphName>, transform: Affine) -> Self {
        Self {
            base: base.into(),
            transform,
        }
    }

    /// A component placed with a plain offset
    pub fn offset(base: impl Into<GlyphName>, dx: f64, dy: f64) -> Self {
        Self::new(base, Affine::translate((dx, dy)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub name: GlyphName,
    pub width: f64,
    pub height: f64,
    pub codepoints: Vec<Codepoint>,
    pub contours: Vec<Contour>,
    pub components: Vec<Component>,
    pub anchors: Vec<Anchor>,
}

impl Glyph {
    pub fn new(name: impl Into<GlyphName>) -> Self {
        Self {
            name: name.into(),
            width: 0.0,
            height: 0.0,
            codepoints: Vec::new(),
            contours: Vec::new(),
            components: Vec::new(),
            anchors: Vec::new(),
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_codepoint(mut self, codepoint: impl Into<Codepoint>) -> Self {
        self.codepoints.push(codepoint.into());
        self
    }

    pub fn with_contour(mut self, contour: Contour) -> Self {
        self.contours.push(contour);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    /// Draw contours, then component references
    pub fn draw(&self, pen: &mut impl OutlinePen) {
        for contour in &self.contours {
            contour.draw(pen);
        }
        for component in &self.components {
            pen.add_component(&component.base, component.transform);
        }
    }
}
