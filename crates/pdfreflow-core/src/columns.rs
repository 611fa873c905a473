//! Two-column page splitting
//!
//! Each page of a two-column document is laid out on a canvas twice as wide:
//!
//! ```text
//! source            destination
//! ┌─────┬─────┐     ┌─────┬─────┬─────┬─────┐
//! │  A  │  B  │ ->  │  A  │ ≡≡≡ │  B  │ ≡≡≡ │
//! └─────┴─────┘     └─────┴─────┴─────┴─────┘
//! ```
//!
//! The left column stays where it was, the right column moves to start at
//! the original page width, and the space after each column is filled with
//! ruled lines. An optional header band at the top of a page is copied
//! across the full width before splitting.

use crate::clip::ClipMap;
use crate::compose::{LineStyle, PageCanvas, PdfComposer, SourceDocument};
use crate::error::ReflowError;
use crate::geometry::{Placement, Point, Rect};
use crate::report::{PageReport, ReflowReport};
use crate::{A4_WIDTH, DEFAULT_GRID_WIDTH, GRID_OFFSET};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SplitOptions {
    /// x-coordinate separating the left and right column on the source page
    pub divide: u32,
    /// Vertical spacing of the ruled lines
    pub grid_width: u32,
    /// Per-page header heights
    pub clips: ClipMap,
    pub line_style: LineStyle,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            divide: A4_WIDTH / 2,
            grid_width: DEFAULT_GRID_WIDTH,
            clips: ClipMap::new(),
            line_style: LineStyle::default(),
        }
    }
}

impl SplitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn divide(mut self, divide: u32) -> Self {
        self.divide = divide;
        self
    }

    pub fn grid_width(mut self, grid_width: u32) -> Self {
        self.grid_width = grid_width;
        self
    }

    pub fn clips(mut self, clips: ClipMap) -> Self {
        self.clips = clips;
        self
    }

    pub fn validate(&self) -> Result<(), ReflowError> {
        if self.grid_width == 0 {
            return Err(ReflowError::InvalidOption(
                "Grid width must be >= 1".into(),
            ));
        }
        if self.divide == 0 {
            return Err(ReflowError::InvalidOption("Divide must be >= 1".into()));
        }
        Ok(())
    }
}

/// A ruled line in destination page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Everything drawn on one destination page
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub page: Rect,
    pub header_height: Option<u32>,
    pub header: Option<Placement>,
    pub left: Placement,
    pub right: Placement,
    /// Lines of the band after the left column, then the band after the right one
    pub grid_lines: Vec<GridLine>,
}

impl ColumnLayout {
    /// Plan the destination page for a source page of size `source`
    pub fn for_page(
        source: Rect,
        page_number: u32,
        options: &SplitOptions,
    ) -> Result<Self, ReflowError> {
        let (w, h) = (source.width(), source.height());
        let divide = options.divide as f64;

        if divide <= 0.0 || divide >= w {
            return Err(ReflowError::InvalidGeometry(format!(
                "Page {}: divide {} must lie strictly between 0 and the page width {:.2}",
                page_number, options.divide, w
            )));
        }

        let header_height = options.clips.header_height(page_number);
        let top = header_height.unwrap_or(0);
        if top as f64 >= h {
            return Err(ReflowError::InvalidGeometry(format!(
                "Page {}: clip height {} must be below the page height {:.2}",
                page_number, top, h
            )));
        }
        let top_f = top as f64;

        // An entry of 0 stays in the report but draws no header band, since
        // the band would be empty
        let header = match header_height {
            Some(hh) if hh > 0 => {
                let band = Rect::new(0.0, 0.0, w, hh as f64);
                Some(Placement::new(band, band))
            }
            _ => None,
        };

        let left_region = Rect::new(0.0, top_f, divide, h);
        let left = Placement::new(left_region, left_region);
        let right = Placement::new(
            Rect::new(divide, top_f, w, h),
            Rect::new(w, top_f, 2.0 * w - divide, h),
        );

        let page = Rect::from_size(2.0 * w, h);
        let offset = GRID_OFFSET as f64;
        let ys = grid_positions(top, h, options.grid_width);

        let mut grid_lines = Vec::with_capacity(ys.len() * 2);
        for &y in &ys {
            grid_lines.push(GridLine {
                from: Point::new(divide + offset, y),
                to: Point::new(w - offset, y),
            });
        }
        for &y in &ys {
            grid_lines.push(GridLine {
                from: Point::new(2.0 * w - divide + offset, y),
                to: Point::new(page.width() - offset, y),
            });
        }

        Ok(Self {
            page,
            header_height,
            header,
            left,
            right,
            grid_lines,
        })
    }

    pub fn lines_per_band(&self) -> usize {
        self.grid_lines.len() / 2
    }
}

/// Line positions from `start` up to (excluding) the page height truncated to
/// a whole number, stepping by `step`
fn grid_positions(start: u32, page_height: f64, step: u32) -> Vec<f64> {
    let end = page_height.trunc() as i64;
    (start as i64..end)
        .step_by(step.max(1) as usize)
        .map(|y| y as f64)
        .collect()
}

/// Split every two-column page of `bytes` into side-by-side panels
pub fn split_columns(
    bytes: &[u8],
    options: &SplitOptions,
) -> Result<(Vec<u8>, ReflowReport), ReflowError> {
    options.validate()?;

    let source = SourceDocument::from_bytes(bytes)?;
    let mut pages = Vec::with_capacity(source.page_count());
    let mut composer = PdfComposer::new();
    let forms = composer.import(source);

    for form in &forms {
        let layout = ColumnLayout::for_page(form.rect(), form.number, options)?;
        let (w, h) = (form.rect().width(), form.rect().height());
        let (new_w, new_h) = (layout.page.width(), layout.page.height());

        info!("Page {}: original size = ({:.2} x {:.2})", form.number, w, h);
        info!("Page {}: new size      = ({:.2} x {:.2})", form.number, new_w, new_h);
        if let Some(hh) = layout.header_height {
            info!("Page {}: clip height = ({:.2})", form.number, hh as f64);
        }

        let mut canvas = PageCanvas::new(new_w, new_h);
        if let Some(header) = layout.header {
            canvas.show_form(form, header);
        }
        canvas.show_form(form, layout.left);
        canvas.show_form(form, layout.right);
        for line in &layout.grid_lines {
            canvas.draw_line(line.from, line.to, &options.line_style);
        }
        composer.add_page(canvas)?;

        pages.push(PageReport {
            number: form.number,
            original_size: (w, h),
            new_size: (new_w, new_h),
            header_height: layout.header_height,
        });
    }

    let output = composer.finish()?;
    let report = ReflowReport {
        pages,
        input_size_bytes: bytes.len(),
        output_size_bytes: output.len(),
    };
    Ok((output, report))
}

/// File-to-file variant of [`split_columns`]. Nothing is written unless
/// every page was processed.
pub fn split_columns_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &SplitOptions,
) -> Result<ReflowReport, ReflowError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    info!("Opening PDF: {}", input.display());
    let bytes = crate::read_input(input)?;

    let (pdf, report) = split_columns(&bytes, options)?;

    info!("Saving to: {}", output.display());
    std::fs::write(output, pdf)?;
    info!("Done! {} page(s) written", report.page_count());
    Ok(report)
}
