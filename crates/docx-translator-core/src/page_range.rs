//! Page ranges as the user types them, and as the converter expects them.

use crate::error::{Error, Result};

/// User-facing page range: 1-based, either bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRange {
    start: Option<u32>,
    end: Option<u32>,
}

/// Converter-facing page range: 0-based indices, either bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroBasedRange {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl PageRange {
    /// Validate a 1-based range.
    ///
    /// An end page before the start page is rejected, never swapped.
    pub fn new(start: Option<u32>, end: Option<u32>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            return Err(Error::InvalidPageRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Convert to the converter's 0-based convention.
    pub const fn to_zero_based(&self) -> ZeroBasedRange {
        ZeroBasedRange {
            start: match self.start {
                Some(p) => Some(p.saturating_sub(1)),
                None => None,
            },
            end: match self.end {
                Some(p) => Some(p.saturating_sub(1)),
                None => None,
            },
        }
    }

    /// Check the start page against the document's page count.
    pub fn check_against(&self, page_count: usize) -> Result<()> {
        match self.start {
            Some(start) if usize::try_from(start).unwrap_or(usize::MAX) > page_count => {
                Err(Error::PageOutOfRange {
                    page: start,
                    total: page_count,
                })
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "all pages"),
            (Some(s), None) => write!(f, "pages {s}-"),
            (None, Some(e)) => write!(f, "pages -{e}"),
            (Some(s), Some(e)) => write!(f, "pages {s}-{e}"),
        }
    }
}
