//! Per-page header heights
//!
//! Parsed from strings like `"1:100, 3:250"`: page number (1-indexed) and the
//! height of the band at the top of that page to keep unsplit.

use crate::error::ReflowError;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipMap {
    heights: BTreeMap<u32, u32>,
}

impl ClipMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header height for a page, replacing any previous entry
    pub fn insert(&mut self, page: u32, height: u32) -> Option<u32> {
        self.heights.insert(page, height)
    }

    /// Header height for a 1-indexed page, `None` when the page has no entry
    pub fn header_height(&self, page: u32) -> Option<u32> {
        self.heights.get(&page).copied()
    }

    /// Merge another map in, entries from `other` win
    pub fn extend(&mut self, other: ClipMap) {
        self.heights.extend(other.heights);
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.heights.iter().map(|(&p, &h)| (p, h))
    }
}

impl FromIterator<(u32, u32)> for ClipMap {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            heights: iter.into_iter().collect(),
        }
    }
}

impl FromStr for ClipMap {
    type Err = ReflowError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut map = ClipMap::new();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (page, height) = part.split_once(':').ok_or_else(|| {
                ReflowError::InvalidClip(format!("Expected page:height, got '{}'", part))
            })?;

            let page: u32 = page
                .trim()
                .parse()
                .map_err(|_| ReflowError::InvalidClip(format!("Invalid page: {}", page)))?;
            let height: u32 = height
                .trim()
                .parse()
                .map_err(|_| ReflowError::InvalidClip(format!("Invalid height: {}", height)))?;

            if page == 0 {
                return Err(ReflowError::InvalidClip(
                    "Page numbers must be >= 1".into(),
                ));
            }

            map.insert(page, height);
        }

        if map.is_empty() {
            return Err(ReflowError::InvalidClip("No clip entries given".into()));
        }

        Ok(map)
    }
}
