use crate::header::HeaderRegistry;
use crate::header::Pin;
use ratatui::layout::Rect;

/// A column placed inside a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneColumn {
    /// Position of the header in the registry.
    pub header: usize,
    /// Offset from the zone's left edge.
    pub start: u32,
    pub width: u16,
}

impl ZoneColumn {
    pub fn end(&self) -> u32 {
        self.start + self.width as u32
    }
}

/// The columns sharing one pin zone, laid out left to right.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Zone {
    pub columns: Vec<ZoneColumn>,
    pub width: u32,
}

impl Zone {
    fn push(&mut self, header: usize, width: u16) {
        self.columns.push(ZoneColumn {
            header,
            start: self.width,
            width,
        });
        self.width += width as u32;
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column under `x` (zone coordinates).
    pub fn column_at(&self, x: u32) -> Option<&ZoneColumn> {
        self.columns.iter().find(|c| x >= c.start && x < c.end())
    }
}

/// Screen rectangles of the three panes (and the scrollbar gutter) for one horizontal band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaneRects {
    pub left: Rect,
    pub center: Rect,
    pub right: Rect,
    pub gutter: Rect,
}

/// Horizontal split of the grid into left-pinned, scrollable center and right-pinned panes.
///
/// The left zone is clamped to the container first, then the right zone to what is left; the
/// center viewport gets the remainder minus the gutter reserved for the body's vertical
/// scrollbar. In the header band the gutter is drawn as extra margin after the right-most visible
/// column so header and body columns line up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaneLayout {
    pub left: Zone,
    pub center: Zone,
    pub right: Zone,
    pub container_width: u16,
    pub gutter: u16,
}

impl PaneLayout {
    pub fn compute(headers: &HeaderRegistry, container_width: u16, gutter: u16) -> Self {
        let mut left = Zone::default();
        let mut center = Zone::default();
        let mut right = Zone::default();
        for (i, h) in headers.iter().enumerate() {
            match h.pin {
                Pin::Left => left.push(i, h.width),
                Pin::View => center.push(i, h.width),
                Pin::Right => right.push(i, h.width),
            }
        }
        Self {
            left,
            center,
            right,
            container_width,
            gutter: gutter.min(container_width),
        }
    }

    pub fn left_width(&self) -> u16 {
        self.left
            .width
            .min(self.container_width.saturating_sub(self.gutter) as u32) as u16
    }

    pub fn right_width(&self) -> u16 {
        let room = self
            .container_width
            .saturating_sub(self.gutter)
            .saturating_sub(self.left_width());
        self.right.width.min(room as u32) as u16
    }

    /// `container - left - right - gutter`, never negative.
    pub fn center_viewport_width(&self) -> u16 {
        self.container_width
            .saturating_sub(self.left_width())
            .saturating_sub(self.right_width())
            .saturating_sub(self.gutter)
    }

    /// How far the center pane can scroll horizontally.
    pub fn center_overflow(&self) -> u32 {
        self.center
            .width
            .saturating_sub(self.center_viewport_width() as u32)
    }

    /// Registry position of the right-most visible column.
    pub fn rightmost_column(&self) -> Option<usize> {
        self.right
            .columns
            .last()
            .or_else(|| self.center.columns.last())
            .or_else(|| self.left.columns.last())
            .map(|c| c.header)
    }

    /// Extra margin drawn after `header` in the header band.
    pub fn trailing_margin(&self, header: usize) -> u16 {
        if self.rightmost_column() == Some(header) {
            self.gutter
        } else {
            0
        }
    }

    pub fn pane_rects(&self, band: Rect) -> PaneRects {
        let left_w = self.left_width().min(band.width);
        let center_w = self.center_viewport_width().min(band.width - left_w);
        let right_w = self.right_width().min(band.width - left_w - center_w);
        let gutter_w = self.gutter.min(band.width - left_w - center_w - right_w);
        let mut x = band.x;
        let left = Rect::new(x, band.y, left_w, band.height);
        x += left_w;
        let center = Rect::new(x, band.y, center_w, band.height);
        x += center_w;
        let right = Rect::new(x, band.y, right_w, band.height);
        x += right_w;
        let gutter = Rect::new(x, band.y, gutter_w, band.height);
        PaneRects {
            left,
            center,
            right,
            gutter,
        }
    }

    /// Registry position of the column under screen column `x` inside `band`.
    pub fn column_at(&self, band: Rect, x: u16, scroll_left: u32) -> Option<usize> {
        let rects = self.pane_rects(band);
        let hit = |r: Rect| x >= r.x && x < r.x + r.width;
        if hit(rects.left) {
            return self.left.column_at((x - rects.left.x) as u32).map(|c| c.header);
        }
        if hit(rects.center) {
            let rel = (x - rects.center.x) as u32 + scroll_left;
            return self.center.column_at(rel).map(|c| c.header);
        }
        if hit(rects.right) {
            return self.right.column_at((x - rects.right.x) as u32).map(|c| c.header);
        }
        None
    }
}
