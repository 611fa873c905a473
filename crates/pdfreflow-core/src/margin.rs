//! Fixed height plus right margin
//!
//! Every page is redrawn unscaled at the top-left of a page that is `margin`
//! points wider and exactly `target_height` tall. Content below the target
//! height falls off the page.

use crate::compose::{PageCanvas, PdfComposer, SourceDocument};
use crate::error::ReflowError;
use crate::geometry::{Placement, Rect};
use crate::report::{PageReport, ReflowReport};
use crate::{A4_HEIGHT, DEFAULT_MARGIN};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginOptions {
    /// Extra width added on the right, in points
    pub margin: f64,
    /// Height of every output page, in points
    pub target_height: f64,
}

impl Default for MarginOptions {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            target_height: A4_HEIGHT,
        }
    }
}

impl MarginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn target_height(mut self, height: f64) -> Self {
        self.target_height = height;
        self
    }

    pub fn validate(&self) -> Result<(), ReflowError> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ReflowError::InvalidOption(format!(
                "Margin must be >= 0, got {}",
                self.margin
            )));
        }
        if !self.target_height.is_finite() || self.target_height <= 0.0 {
            return Err(ReflowError::InvalidOption(format!(
                "Target height must be > 0, got {}",
                self.target_height
            )));
        }
        Ok(())
    }
}

/// Output page size and content placement for one source page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginLayout {
    pub page: Rect,
    pub content: Placement,
}

impl MarginLayout {
    pub fn for_page(source: Rect, options: &MarginOptions) -> Self {
        let page = Rect::from_size(source.width() + options.margin, options.target_height);
        let full = Rect::from_size(source.width(), source.height());
        Self {
            page,
            content: Placement::new(full, full),
        }
    }

    /// True when part of the source page ends up below the output page
    pub fn truncates(&self) -> bool {
        self.content.dest.height() > self.page.height()
    }
}

/// Resize every page of `bytes` to a fixed height and add a right margin
pub fn fix_height_with_margin(
    bytes: &[u8],
    options: &MarginOptions,
) -> Result<(Vec<u8>, ReflowReport), ReflowError> {
    options.validate()?;

    let source = SourceDocument::from_bytes(bytes)?;
    let mut pages = Vec::with_capacity(source.page_count());
    let mut composer = PdfComposer::new();
    let forms = composer.import(source);

    for form in &forms {
        let layout = MarginLayout::for_page(form.rect(), options);
        let (w, h) = (form.rect().width(), form.rect().height());
        let (new_w, new_h) = (layout.page.width(), layout.page.height());

        info!("Page {}: original size = ({:.2} x {:.2})", form.number, w, h);
        info!("Page {}: new size      = ({:.2} x {:.2})", form.number, new_w, new_h);
        if layout.truncates() {
            warn!(
                "Page {}: {:.2}pt of content falls below the new page height",
                form.number,
                h - new_h
            );
        }

        let mut canvas = PageCanvas::new(new_w, new_h);
        canvas.show_form(form, layout.content);
        composer.add_page(canvas)?;

        pages.push(PageReport {
            number: form.number,
            original_size: (w, h),
            new_size: (new_w, new_h),
            header_height: None,
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

/// File-to-file variant of [`fix_height_with_margin`]. Nothing is written
/// unless every page was processed.
pub fn fix_height_with_margin_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &MarginOptions,
) -> Result<ReflowReport, ReflowError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    info!("Opening PDF: {}", input.display());
    let bytes = crate::read_input(input)?;

    let (pdf, report) = fix_height_with_margin(&bytes, options)?;

    info!("Saving to: {}", output.display());
    std::fs::write(output, pdf)?;
    info!("Done! {} page(s) written", report.page_count());
    Ok(report)
}
