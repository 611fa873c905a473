//! PDF page reflow operations
//!
//! This crate rebuilds PDFs page by page using lopdf, drawing each original
//! page as a Form XObject onto a newly sized page.
//!
//! Two transforms are available:
//! - `fix_height_with_margin`: fixed page height plus a blank right margin
//! - `split_columns`: two-column pages laid out side by side with ruled margins

pub mod clip;
pub mod columns;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod margin;
pub mod report;

pub use clip::ClipMap;
pub use columns::{split_columns, split_columns_file, ColumnLayout, GridLine, SplitOptions};
pub use compose::{FormXObject, LineStyle, PageCanvas, PdfComposer, SourceDocument};
pub use error::ReflowError;
pub use geometry::{PageBox, Placement, Point, Rect};
pub use margin::{fix_height_with_margin, fix_height_with_margin_file, MarginLayout, MarginOptions};
pub use report::{PageReport, ReflowReport};

use std::path::Path;

/// A4 width in points
pub const A4_WIDTH: u32 = 595;
/// A4 height in points
pub const A4_HEIGHT: f64 = 842.0;
/// Right margin added by the height-fix transform
pub const DEFAULT_MARGIN: f64 = 300.0;
/// Spacing of the ruled lines drawn by the column splitter
pub const DEFAULT_GRID_WIDTH: u32 = 20;
/// Inset of each ruled line from both edges of its margin band
pub const GRID_OFFSET: u32 = 10;

/// Read an input PDF, mapping a missing file to [`ReflowError::FileNotFound`]
pub fn read_input(path: &Path) -> Result<Vec<u8>, ReflowError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReflowError::FileNotFound(path.to_path_buf()),
        _ => ReflowError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("/no/such/dir/input.pdf")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("input.pdf"));
    }
}
