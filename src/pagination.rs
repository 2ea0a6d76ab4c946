#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    filtered_total: u64,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            filtered_total: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn filtered_total(&self) -> u64 {
        self.filtered_total
    }

    /// Records a new filtered count and pulls the page index back inside it.
    pub fn set_filtered_total(&mut self, total: u64) {
        self.filtered_total = total;
        self.page = self.page.min(self.last_page());
    }

    pub fn last_page(&self) -> usize {
        if self.filtered_total == 0 {
            return 0;
        }
        let pages = self.filtered_total.div_ceil(self.page_size as u64);
        (pages - 1) as usize
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    pub fn go_first(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn go_last(&mut self) -> bool {
        self.move_to(self.last_page())
    }

    pub fn go_next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.move_to(self.page + 1)
    }

    pub fn go_prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.move_to(self.page - 1)
    }

    /// Jumps to `page`, clamped to the last page.
    pub fn go_to(&mut self, page: usize) -> bool {
        self.move_to(page.min(self.last_page()))
    }

    fn move_to(&mut self, page: usize) -> bool {
        let changed = self.page != page;
        self.page = page;
        changed
    }

    /// `(offset, limit)` of the current page.
    pub fn window(&self) -> (u64, u64) {
        ((self.page * self.page_size) as u64, self.page_size as u64)
    }

    /// One-based inclusive row span shown on the current page.
    pub fn row_span(&self) -> Option<(u64, u64)> {
        if self.filtered_total == 0 {
            return None;
        }
        let (offset, limit) = self.window();
        let start = offset + 1;
        let end = (offset + limit).min(self.filtered_total);
        if start > end {
            return None;
        }
        Some((start, end))
    }

    pub fn range_label(&self) -> String {
        match self.row_span() {
            Some((start, end)) => format!("{start}-{end} of {}", self.filtered_total),
            None => format!("0-0 of {}", self.filtered_total),
        }
    }
}
