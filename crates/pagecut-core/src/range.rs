//! Page range selection
//!
//! A [`RangeSelection`] is what the user has typed or clicked: both bounds are
//! clamped into the document but may be out of order. A [`PageRange`] is the
//! validated form and is the only thing the extractor accepts.

use crate::error::PageCutError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Smallest page count for which the "first half" preset is offered.
///
/// With two pages the first half is page 1, which duplicates "First".
pub const FIRST_HALF_MIN_PAGES: u32 = 3;

/// Clamp a typed bound into `[1, page_count]`
pub fn clamp_page(value: i64, page_count: u32) -> u32 {
    let max = i64::from(page_count.max(1));
    value.clamp(1, max) as u32
}

/// Range check on raw integers: `1 <= start <= end <= page_count`
pub fn is_valid_range(start: i64, end: i64, page_count: u32) -> bool {
    start >= 1 && end >= start && end <= i64::from(page_count)
}

/// Inclusive, 1-indexed, validated page interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32, page_count: u32) -> Result<Self, PageCutError> {
        if start < 1 {
            return Err(PageCutError::invalid("Start page must be at least 1"));
        }
        if end < start {
            return Err(PageCutError::invalid(format!(
                "End page {} is before start page {}",
                end, start
            )));
        }
        if end > page_count {
            return Err(PageCutError::invalid(format!(
                "Page {} is out of range (1-{})",
                end, page_count
            )));
        }
        Ok(Self { start, end })
    }

    /// Every page of a document with `page_count >= 1` pages
    pub fn full(page_count: u32) -> Self {
        Self {
            start: 1,
            end: page_count.max(1),
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of selected pages, `end - start + 1`
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Always false; a validated range holds at least one page
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Zero-indexed page list handed to the document engine
    pub fn zero_indexed(&self) -> Vec<u32> {
        (self.start - 1..self.end).collect()
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Which bound a click in the preview strip sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTarget {
    Start,
    End,
}

impl FromStr for PreviewTarget {
    type Err = PageCutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(PageCutError::invalid(format!(
                "Unknown preview target: {}",
                other
            ))),
        }
    }
}

/// One-click range presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickSelect {
    All,
    First,
    Last,
    FirstHalf,
}

impl QuickSelect {
    /// Presets offered for a document with `page_count` pages
    pub fn available(page_count: u32) -> Vec<QuickSelect> {
        if page_count == 0 {
            return Vec::new();
        }
        let mut presets = vec![QuickSelect::All, QuickSelect::First, QuickSelect::Last];
        if page_count >= FIRST_HALF_MIN_PAGES {
            presets.push(QuickSelect::FirstHalf);
        }
        presets
    }

    /// The range this preset selects, or `None` when it is not offered
    pub fn range(self, page_count: u32) -> Option<PageRange> {
        if !Self::available(page_count).contains(&self) {
            return None;
        }
        let (start, end) = match self {
            QuickSelect::All => (1, page_count),
            QuickSelect::First => (1, 1),
            QuickSelect::Last => (page_count, page_count),
            QuickSelect::FirstHalf => (1, page_count.div_ceil(2)),
        };
        Some(PageRange { start, end })
    }
}

impl FromStr for QuickSelect {
    type Err = PageCutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "first_half" | "firsthalf" => Ok(Self::FirstHalf),
            other => Err(PageCutError::invalid(format!(
                "Unknown quick select: {}",
                other
            ))),
        }
    }
}

/// Raw user selection; may be unordered until validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeSelection {
    pub start: u32,
    pub end: u32,
}

impl RangeSelection {
    pub fn full(page_count: u32) -> Self {
        let range = PageRange::full(page_count);
        Self {
            start: range.start,
            end: range.end,
        }
    }

    pub fn set_start(&mut self, value: i64, page_count: u32) {
        self.start = clamp_page(value, page_count);
    }

    pub fn set_end(&mut self, value: i64, page_count: u32) {
        self.end = clamp_page(value, page_count);
    }

    /// Set one bound to a page clicked in the preview
    pub fn select_page(&mut self, target: PreviewTarget, page: i64, page_count: u32) {
        match target {
            PreviewTarget::Start => self.set_start(page, page_count),
            PreviewTarget::End => self.set_end(page, page_count),
        }
    }

    pub fn apply(&mut self, preset: QuickSelect, page_count: u32) -> Result<(), PageCutError> {
        let range = preset.range(page_count).ok_or_else(|| {
            PageCutError::invalid(format!(
                "{:?} is not available for a {}-page document",
                preset, page_count
            ))
        })?;
        *self = range.into();
        Ok(())
    }

    pub fn validate(&self, page_count: u32) -> Result<PageRange, PageCutError> {
        PageRange::new(self.start, self.end, page_count)
    }

    pub fn is_valid(&self, page_count: u32) -> bool {
        is_valid_range(i64::from(self.start), i64::from(self.end), page_count)
    }

    /// Page count shown next to the inputs, `None` while invalid
    pub fn selected_count(&self, page_count: u32) -> Option<u32> {
        self.validate(page_count).ok().map(|r| r.len())
    }

    /// Parse a typed range like `"3-5"` or a single page like `"7"`
    pub fn parse(input: &str, page_count: u32) -> Result<Self, PageCutError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PageCutError::invalid("Page range cannot be empty"));
        }

        let (start, end) = match input.split_once('-') {
            Some((start, end)) => (parse_bound(start)?, parse_bound(end)?),
            None => {
                let page = parse_bound(input)?;
                (page, page)
            }
        };

        PageRange::new(start, end, page_count).map(Self::from)
    }
}

impl From<PageRange> for RangeSelection {
    fn from(range: PageRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

fn parse_bound(s: &str) -> Result<u32, PageCutError> {
    let s = s.trim();
    s.parse()
        .map_err(|_| PageCutError::invalid(format!("Invalid page number: {}", s)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any ordered in-bounds range is valid and counts e - s + 1
        #[test]
        fn ordered_range_is_valid(page_count in 1u32..2000, a in 1u32..2000, b in 1u32..2000) {
            let start = a.min(b).min(page_count);
            let end = a.max(b).min(page_count);
            prop_assume!(start <= end);

            prop_assert!(is_valid_range(start as i64, end as i64, page_count));
            let selection = RangeSelection { start, end };
            prop_assert_eq!(selection.selected_count(page_count), Some(end - start + 1));
        }

        /// Property: reversed, zero or past-the-end ranges are never valid
        #[test]
        fn out_of_bounds_range_is_invalid(
            page_count in 1u32..500,
            start in -10i64..600,
            end in -10i64..600
        ) {
            prop_assume!(end < start || start < 1 || end > page_count as i64);
            prop_assert!(!is_valid_range(start, end, page_count));
        }

        /// Property: typed bounds always land inside the document
        #[test]
        fn clamped_bounds_stay_in_document(page_count in 1u32..5000, value in any::<i64>()) {
            let page = clamp_page(value, page_count);
            prop_assert!(page >= 1 && page <= page_count);
        }

        /// Property: every offered preset yields a valid range
        #[test]
        fn presets_are_valid(page_count in 1u32..5000) {
            for preset in QuickSelect::available(page_count) {
                let range = preset.range(page_count).unwrap();
                prop_assert!(is_valid_range(range.start() as i64, range.end() as i64, page_count));
            }
        }
    }
}
