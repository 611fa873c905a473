/// What happened to a single page
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// 1-indexed page number
    pub number: u32,
    pub original_size: (f64, f64),
    pub new_size: (f64, f64),
    /// Header band kept unsplit, when one was requested for this page
    pub header_height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflowReport {
    pub pages: Vec<PageReport>,
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
}

impl ReflowReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
