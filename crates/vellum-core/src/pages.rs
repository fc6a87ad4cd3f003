//! A4 notebook page layout.
//!
//! Pages are stacked vertically from the world origin, all the same size,
//! separated by a fixed gap.

use kurbo::Rect;

/// A4 width in points.
pub const PAGE_WIDTH: f64 = 595.0;
/// A4 height in points.
pub const PAGE_HEIGHT: f64 = 842.0;
/// Vertical gap between consecutive pages.
pub const PAGE_GAP: f64 = 48.0;
/// Distance from the top of one page to the top of the next.
pub const PAGE_STRIDE: f64 = PAGE_HEIGHT + PAGE_GAP;

/// World rectangle of page `index`.
pub fn page_rect(index: usize) -> Rect {
    let y0 = index as f64 * PAGE_STRIDE;
    Rect::new(0.0, y0, PAGE_WIDTH, y0 + PAGE_HEIGHT)
}

/// Index of the page whose stride band contains world `y` (gap included).
/// Negative `y` maps to page 0.
pub fn page_index_at(y: f64) -> usize {
    if y <= 0.0 || !y.is_finite() {
        return 0;
    }
    (y / PAGE_STRIDE).floor() as usize
}

/// Pages to draw for a visible world rect, with one extra page on each side.
pub fn pages_in_view(visible: Rect) -> std::ops::RangeInclusive<usize> {
    let visible = visible.abs();
    let first = page_index_at(visible.y0).saturating_sub(1);
    let last = page_index_at(visible.y1) + 1;
    first..=last
}

/// Number of pages needed to hold content with the given bounds; at least one.
pub fn page_count_for(content: Option<Rect>) -> usize {
    content.map_or(1, |r| page_index_at(r.abs().y1) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_rect() {
        assert_eq!(page_rect(0), Rect::new(0.0, 0.0, 595.0, 842.0));
        assert_eq!(page_rect(2), Rect::new(0.0, 1780.0, 595.0, 2622.0));
    }

    #[test]
    fn test_pages_in_view_never_negative() {
        assert_eq!(pages_in_view(Rect::new(0.0, -500.0, 600.0, 100.0)), 0..=1);
        assert_eq!(pages_in_view(Rect::new(0.0, 2000.0, 600.0, 2100.0)), 1..=3);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count_for(None), 1);
        assert_eq!(page_count_for(Some(Rect::new(10.0, 10.0, 100.0, 100.0))), 1);
        // a stroke sitting in the gap after page 0 still belongs to band 0
        assert_eq!(page_count_for(Some(Rect::new(0.0, 0.0, 10.0, 870.0))), 1);
        assert_eq!(page_count_for(Some(Rect::new(0.0, 0.0, 10.0, 900.0))), 2);
    }
}
