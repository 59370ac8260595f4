/// Which center pane a horizontal scroll originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollSource {
    Header,
    Body,
}

/// Mirrors the horizontal offset of the header's center pane and the body's center pane.
///
/// A scroll on either side writes both positions directly in the same call. Nothing is
/// re-dispatched to the other pane's handler, so a mirrored write can never echo back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollSync {
    header_left: u32,
    body_left: u32,
    max_left: u32,
}

impl ScrollSync {
    pub fn header_left(&self) -> u32 {
        self.header_left
    }

    pub fn body_left(&self) -> u32 {
        self.body_left
    }

    pub fn max_left(&self) -> u32 {
        self.max_left
    }

    /// Updates the scrollable range (center content width minus its viewport).
    pub fn set_max_left(&mut self, max_left: u32) {
        self.max_left = max_left;
        let left = self.body_left.min(max_left);
        self.write(left);
    }

    /// Handles a scroll reported by `source`. Returns `true` if the shared offset changed.
    pub fn on_scroll(&mut self, source: ScrollSource, left: u32) -> bool {
        let left = left.min(self.max_left);
        let current = match source {
            ScrollSource::Header => self.header_left,
            ScrollSource::Body => self.body_left,
        };
        if current == left && self.header_left == self.body_left {
            return false;
        }
        self.write(left);
        true
    }

    pub fn scroll_by(&mut self, source: ScrollSource, delta: i32) -> bool {
        let current = match source {
            ScrollSource::Header => self.header_left,
            ScrollSource::Body => self.body_left,
        };
        let next = (current as i64 + delta as i64).clamp(0, self.max_left as i64) as u32;
        self.on_scroll(source, next)
    }

    fn write(&mut self, left: u32) {
        self.header_left = left;
        self.body_left = left;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync(max: u32) -> ScrollSync {
        let mut s = ScrollSync::default();
        s.set_max_left(max);
        s
    }

    #[test]
    fn body_scroll_mirrors_to_header() {
        let mut s = sync(100);
        assert!(s.on_scroll(ScrollSource::Body, 40));
        assert_eq!(s.header_left(), 40);
        assert_eq!(s.body_left(), 40);
    }

    #[test]
    fn header_scroll_mirrors_to_body() {
        let mut s = sync(100);
        assert!(s.on_scroll(ScrollSource::Header, 7));
        assert_eq!(s.body_left(), 7);
    }

    #[test]
    fn mirrored_position_does_not_oscillate() {
        let mut s = sync(100);
        s.on_scroll(ScrollSource::Body, 30);
        assert!(!s.on_scroll(ScrollSource::Header, s.header_left()));
        assert!(!s.on_scroll(ScrollSource::Body, s.body_left()));
        assert_eq!((s.header_left(), s.body_left()), (30, 30));
    }

    #[test]
    fn offsets_clamp_to_range() {
        let mut s = sync(10);
        s.on_scroll(ScrollSource::Body, 50);
        assert_eq!(s.body_left(), 10);
        s.set_max_left(4);
        assert_eq!((s.header_left(), s.body_left()), (4, 4));
        s.scroll_by(ScrollSource::Header, -100);
        assert_eq!(s.body_left(), 0);
    }
}
