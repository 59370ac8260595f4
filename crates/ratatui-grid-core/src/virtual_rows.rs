use virtualizer::VirtualItem;
use virtualizer::Virtualizer;
use virtualizer::VirtualizerOptions;

/// Where a scroll-to places its target row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    /// Move only as far as needed to make the row fully visible.
    #[default]
    Auto,
}

/// A rendered row slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualRow {
    /// Position in the current view order.
    pub index: usize,
    /// Absolute top offset (`index * row_height` for fixed-height rows).
    pub top: u64,
    pub height: u32,
}

/// The rows to render for the current scroll offset, overscan included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualWindow {
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
    pub items: Vec<VirtualRow>,
}

impl VirtualWindow {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        !self.items.is_empty() && index >= self.start_index && index <= self.end_index
    }

    fn from_items(items: &[VirtualItem]) -> Self {
        let items: Vec<VirtualRow> = items
            .iter()
            .map(|it| VirtualRow {
                index: it.index,
                top: it.start,
                height: it.size,
            })
            .collect();
        match (items.first(), items.last()) {
            (Some(first), Some(last)) => Self {
                start_index: first.index,
                end_index: last.index,
                items,
            },
            _ => Self::default(),
        }
    }
}

/// Fixed-height row virtualization over the `virtualizer` engine.
///
/// The window is recomputed eagerly whenever the row count, row height, viewport or scroll offset
/// changes, so readers only ever see a window consistent with the current inputs.
pub struct RowVirtualizer {
    v: Virtualizer,
    row_count: usize,
    row_height: u32,
    overscan: usize,
    viewport_height: u32,
    scroll_top: u64,
    items: Vec<VirtualItem>,
    window: VirtualWindow,
}

impl Default for RowVirtualizer {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl RowVirtualizer {
    pub fn new(row_height: u32, overscan: usize) -> Self {
        let row_height = row_height.max(1);
        Self {
            v: Self::make_virtualizer(0, row_height, overscan),
            row_count: 0,
            row_height,
            overscan,
            viewport_height: 0,
            scroll_top: 0,
            items: Vec::new(),
            window: VirtualWindow::default(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn total_height(&self) -> u64 {
        self.row_count as u64 * self.row_height as u64
    }

    pub fn max_scroll_top(&self) -> u64 {
        self.total_height()
            .saturating_sub(self.viewport_height as u64)
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn set_row_count(&mut self, count: usize) {
        if self.row_count == count {
            return;
        }
        self.row_count = count;
        self.recompute();
    }

    pub fn set_row_height(&mut self, height: u32) {
        let height = height.max(1);
        if self.row_height == height {
            return;
        }
        self.row_height = height;
        self.v = Self::make_virtualizer(self.row_count, height, self.overscan);
        self.recompute();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.overscan == overscan {
            return;
        }
        self.overscan = overscan;
        self.recompute();
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        if self.viewport_height == height {
            return;
        }
        self.viewport_height = height;
        self.recompute();
    }

    /// Sets the scroll offset, clamped to `[0, total - viewport]`. Returns the applied offset.
    pub fn set_scroll_top(&mut self, top: u64) -> u64 {
        let top = top.min(self.max_scroll_top());
        if top != self.scroll_top {
            self.scroll_top = top;
            self.recompute();
        }
        self.scroll_top
    }

    pub fn scroll_by(&mut self, delta: i64) -> u64 {
        let next = (self.scroll_top as i64).saturating_add(delta).max(0) as u64;
        self.set_scroll_top(next)
    }

    /// Row under an absolute offset.
    pub fn index_at(&self, offset: u64) -> Option<usize> {
        if self.row_count == 0 || offset >= self.total_height() {
            return None;
        }
        Some((offset / self.row_height as u64) as usize)
    }

    /// Scroll offset that brings `index` into view under `align`, clamped.
    pub fn offset_for(&self, index: usize, align: ScrollAlign) -> u64 {
        let h = self.row_height as u64;
        let vh = self.viewport_height as u64;
        let top = index.min(self.row_count.saturating_sub(1)) as u64 * h;
        let target = match align {
            ScrollAlign::Start => top,
            ScrollAlign::End => (top + h).saturating_sub(vh),
            ScrollAlign::Center => (top + h / 2).saturating_sub(vh / 2),
            ScrollAlign::Auto => {
                if top < self.scroll_top {
                    top
                } else if top + h > self.scroll_top + vh {
                    (top + h).saturating_sub(vh)
                } else {
                    self.scroll_top
                }
            }
        };
        target.min(self.max_scroll_top())
    }

    fn recompute(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
        self.v.set_count(self.row_count);
        self.v.set_overscan(self.overscan);
        self.v.set_viewport_size(self.viewport_height);
        self.v.set_scroll_offset(self.scroll_top);
        self.items.clear();
        if self.row_count > 0 && self.viewport_height > 0 {
            self.v.collect_virtual_items(&mut self.items);
        }
        self.window = VirtualWindow::from_items(&self.items);
        tracing::trace!(
            rows = self.row_count,
            scroll_top = self.scroll_top,
            start = self.window.start_index,
            end = self.window.end_index,
            "virtual window recomputed"
        );
    }

    fn make_virtualizer(count: usize, row_height: u32, overscan: usize) -> Virtualizer {
        let mut opts = VirtualizerOptions::new(count, move |_| row_height);
        opts.overscan = overscan;
        Virtualizer::new(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn virt(rows: usize, h: u32, overscan: usize, viewport: u32) -> RowVirtualizer {
        let mut v = RowVirtualizer::new(h, overscan);
        v.set_viewport_height(viewport);
        v.set_row_count(rows);
        v
    }

    #[test]
    fn total_height_is_rows_times_height() {
        let v = virt(1000, 2, 3, 10);
        assert_eq!(v.total_height(), 2000);
        assert_eq!(v.max_scroll_top(), 1990);
    }

    #[test]
    fn window_covers_every_intersecting_row() {
        for h in [1u32, 3] {
            let mut v = virt(200, h, 2, 10);
            for top in 0..=v.max_scroll_top() {
                v.set_scroll_top(top);
                let w = v.window().clone();
                assert!(!w.is_empty());
                for i in 0..200usize {
                    let row_top = i as u64 * h as u64;
                    let row_bottom = row_top + h as u64;
                    if row_bottom > top && row_top < top + 10 {
                        assert!(w.contains(i), "row {i} missing at top {top} (h={h})");
                    }
                }
                for pair in w.items.windows(2) {
                    assert_eq!(pair[1].index, pair[0].index + 1);
                }
                for item in &w.items {
                    assert_eq!(item.top, item.index as u64 * h as u64);
                    assert_eq!(item.height, h);
                }
            }
        }
    }

    #[test]
    fn overscan_extends_beyond_viewport() {
        let mut v = virt(100, 1, 3, 10);
        v.set_scroll_top(50);
        let w = v.window();
        assert!(w.start_index <= 47);
        assert!(w.end_index >= 62);
    }

    #[test]
    fn zero_rows_yield_empty_window() {
        let v = virt(0, 1, 2, 10);
        assert!(v.window().is_empty());
        assert_eq!(v.total_height(), 0);
    }

    #[test]
    fn scroll_is_clamped_and_shrinking_rows_reclamps() {
        let mut v = virt(50, 1, 0, 10);
        assert_eq!(v.set_scroll_top(500), 40);
        v.set_row_count(20);
        assert_eq!(v.scroll_top(), 10);
        assert_eq!(v.scroll_by(-100), 0);
    }

    #[test]
    fn offset_for_auto_only_moves_when_needed() {
        let mut v = virt(100, 1, 0, 10);
        v.set_scroll_top(20);
        assert_eq!(v.offset_for(25, ScrollAlign::Auto), 20);
        assert_eq!(v.offset_for(35, ScrollAlign::Auto), 26);
        assert_eq!(v.offset_for(5, ScrollAlign::Auto), 5);
        assert_eq!(v.offset_for(99, ScrollAlign::Start), 90);
        assert_eq!(v.offset_for(50, ScrollAlign::Center), 45);
    }

    #[test]
    fn index_at_maps_offsets_to_rows() {
        let v = virt(10, 2, 0, 4);
        assert_eq!(v.index_at(0), Some(0));
        assert_eq!(v.index_at(5), Some(2));
        assert_eq!(v.index_at(20), None);
    }
}
