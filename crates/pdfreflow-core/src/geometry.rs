//! Rectangles and coordinate conversion
//!
//! Layout math works in page space: origin at the top-left corner, y growing
//! downward, units in PDF points. PDF content streams use the bottom-left
//! origin of the page box, so everything is flipped on the way out.

/// A point in top-left page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left and bottom-right corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle anchored at the origin
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A page box as stored in the PDF: `[llx lly urx ury]` in PDF space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    /// Normalizes corner order, some producers write boxes flipped.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            llx: a.min(c),
            lly: b.min(d),
            urx: a.max(c),
            ury: b.max(d),
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// The page rectangle in top-left page space
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    /// Convert a page-space point to PDF user space
    pub fn to_pdf(&self, p: Point) -> (f64, f64) {
        (self.llx + p.x, self.ury - p.y)
    }

    /// Matrix turning this box upright for a page displayed with `/Rotate`
    /// `degrees` (clockwise, a multiple of 90). The result maps the box onto
    /// `[0 0 w h]` with `w` and `h` as seen by the reader.
    pub fn rotation_matrix(&self, degrees: u16) -> Matrix {
        let (a, b, c, d, e, f) = match degrees {
            90 => (0.0, -1.0, 1.0, 0.0, -self.lly, self.urx),
            180 => (-1.0, 0.0, 0.0, -1.0, self.urx, self.ury),
            270 => (0.0, 1.0, -1.0, 0.0, self.ury, -self.llx),
            _ => (1.0, 0.0, 0.0, 1.0, -self.llx, -self.lly),
        };
        Matrix { a, b, c, d, e, f }
    }

    /// Bounding box of this box's corners after `m`
    pub fn transformed(&self, m: &Matrix) -> PageBox {
        let corners = [
            m.apply(self.llx, self.lly),
            m.apply(self.urx, self.lly),
            m.apply(self.llx, self.ury),
            m.apply(self.urx, self.ury),
        ];
        let (x0, y0, x1, y1) = corners.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        );
        PageBox::new(x0, y0, x1, y1)
    }
}

/// Reduce a `/Rotate` value to 0, 90, 180 or 270. Values that are not a
/// multiple of 90 are invalid.
pub fn normalize_rotation(degrees: i64) -> Option<u16> {
    let r = degrees.rem_euclid(360);
    (r % 90 == 0).then_some(r as u16)
}

/// Affine transform `[a b c d e f]` as used by the `cm` operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Where a region of a source page lands on a destination page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Region of the source page, in source page space
    pub clip: Rect,
    /// Target rectangle, in destination page space
    pub dest: Rect,
}

impl Placement {
    pub fn new(clip: Rect, dest: Rect) -> Self {
        Self { clip, dest }
    }

    /// Uniform scale that fits `clip` inside `dest`
    pub fn scale(&self) -> f64 {
        (self.dest.width() / self.clip.width()).min(self.dest.height() / self.clip.height())
    }

    /// The part of `dest` actually covered once `clip` is scaled and centered
    pub fn target(&self) -> Rect {
        let s = self.scale();
        let w = self.clip.width() * s;
        let h = self.clip.height() * s;
        let x0 = self.dest.x0 + (self.dest.width() - w) / 2.0;
        let y0 = self.dest.y0 + (self.dest.height() - h) / 2.0;
        Rect::new(x0, y0, x0 + w, y0 + h)
    }

    /// Map a source page-space point to destination page space
    pub fn map_point(&self, p: Point) -> Point {
        let s = self.scale();
        let t = self.target();
        Point::new(
            t.x0 + s * (p.x - self.clip.x0),
            t.y0 + s * (p.y - self.clip.y0),
        )
    }

    /// Matrix taking source PDF user space to destination PDF user space
    pub fn matrix(&self, src: &PageBox, dst: &PageBox) -> Matrix {
        let s = self.scale();
        let corner = Point::new(self.clip.x0, self.clip.y0);
        let (sx, sy) = src.to_pdf(corner);
        let (dx, dy) = dst.to_pdf(self.map_point(corner));
        Matrix {
            a: s,
            b: 0.0,
            c: 0.0,
            d: s,
            e: dx - s * sx,
            f: dy - s * sy,
        }
    }
}
