//! Page window arithmetic.

/// The contiguous slice of the filtered data shown for one page.
///
/// Page `p` (1-based) covers `[(p - 1) * page_size, p * page_size)`,
/// clamped to the available rows when slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub page: usize,
    /// First index of the window.
    pub start: usize,
    /// One past the last index of the window (unclamped).
    pub end: usize,
}

impl PageWindow {
    /// Computes the window for a page. Page 0 is treated as page 1.
    pub fn new(page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let start = (page - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size);
        Self { page, start, end }
    }

    /// Returns `true` if rows remain past this window.
    pub fn has_more(&self, total: usize) -> bool {
        self.end < total
    }

    /// Slices the window out of the filtered rows.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = self.start.min(rows.len());
        let end = self.end.min(rows.len());
        &rows[start..end]
    }
}
