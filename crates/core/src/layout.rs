//! Page layout rules: panel-count resizing and grid shape.

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Orientation, Page, Panel};

/// Smallest panel count a page may declare.
pub const MIN_PANEL_COUNT: usize = 1;

/// Largest panel count a page may declare.
pub const MAX_PANEL_COUNT: usize = 9;

/// Panel count for freshly added pages.
pub const DEFAULT_PANEL_COUNT: usize = 3;

/// Validate a requested panel count against the supported range.
pub fn validate_panel_count(count: usize) -> Result<(), CoreError> {
    if (MIN_PANEL_COUNT..=MAX_PANEL_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Panel count must be between {MIN_PANEL_COUNT} and {MAX_PANEL_COUNT}, got {count}"
        )))
    }
}

/// Resize a page to exactly `count` panels.
///
/// Panels at indices that still exist are kept untouched (content and
/// image). New indices get blank `panel-<index>` panels; indices past the
/// new count are dropped.
pub fn resize_panels(page: &mut Page, count: usize) {
    page.panels.truncate(count);
    for index in page.panels.len()..count {
        page.panels.push(Panel::empty(index));
    }
    page.panel_count = count;
}

/// Column/row shape of a page grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub columns: u8,
    pub rows: u8,
}

impl GridLayout {
    const fn new(columns: u8, rows: u8) -> Self {
        Self { columns, rows }
    }
}

/// Grid shape for a page with `panel_count` panels.
///
/// Orientation only matters for counts of 1-3 and 5-6; four panels are
/// always 2x2 and seven or more fill a 3x3 grid.
pub fn grid_layout(panel_count: usize, orientation: Orientation) -> GridLayout {
    let horizontal = orientation == Orientation::Horizontal;
    match panel_count {
        0..=2 if horizontal => GridLayout::new(2, 1),
        0..=2 => GridLayout::new(1, 2),
        3 if horizontal => GridLayout::new(3, 1),
        3 => GridLayout::new(1, 3),
        4 => GridLayout::new(2, 2),
        5 | 6 if horizontal => GridLayout::new(3, 2),
        5 | 6 => GridLayout::new(2, 3),
        _ => GridLayout::new(3, 3),
    }
}

/// Whether the panel at `index` stretches across two columns.
///
/// With an odd panel count the last panel fills the gap left in its row.
pub fn spans_two_columns(panel_count: usize, index: usize) -> bool {
    panel_count % 2 == 1 && index + 1 == panel_count
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::model::ImageData;

    fn page_with_content(count: usize) -> Page {
        let mut page = Page::new(1, count);
        for panel in &mut page.panels {
            panel.content = format!("content {}", panel.position);
            panel.image = Some(ImageData::new(format!("img {}", panel.position)));
        }
        page
    }

    #[test]
    fn growing_preserves_existing_and_adds_blank_panels() {
        let mut page = page_with_content(3);
        let before = page.panels.clone();

        resize_panels(&mut page, 5);

        assert_eq!(page.panel_count, 5);
        assert_eq!(page.panels.len(), 5);
        assert_eq!(&page.panels[..3], &before[..]);
        for index in 3..5 {
            assert_eq!(page.panels[index], Panel::empty(index));
        }
    }

    #[test]
    fn shrinking_drops_trailing_panels() {
        let mut page = page_with_content(5);
        let before = page.panels.clone();

        resize_panels(&mut page, 3);

        assert_eq!(page.panel_count, 3);
        assert_eq!(page.panels, before[..3].to_vec());
        assert!(page.panels.iter().all(|p| p.id != "panel-3" && p.id != "panel-4"));
    }

    #[test]
    fn new_page_has_positional_ids() {
        let page = Page::new(2, 3);
        let ids: Vec<_> = page.panels.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["panel-0", "panel-1", "panel-2"]);
        assert_eq!(page.panel_count, 3);
    }

    #[test]
    fn panel_count_bounds() {
        assert!(validate_panel_count(1).is_ok());
        assert!(validate_panel_count(9).is_ok());
        assert_matches!(validate_panel_count(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_panel_count(10), Err(CoreError::Validation(_)));
    }

    #[test]
    fn grid_shapes_follow_orientation() {
        use Orientation::*;
        assert_eq!(grid_layout(2, Horizontal), GridLayout::new(2, 1));
        assert_eq!(grid_layout(2, Vertical), GridLayout::new(1, 2));
        assert_eq!(grid_layout(3, Vertical), GridLayout::new(1, 3));
        assert_eq!(grid_layout(4, Vertical), GridLayout::new(2, 2));
        assert_eq!(grid_layout(5, Horizontal), GridLayout::new(3, 2));
        assert_eq!(grid_layout(6, Vertical), GridLayout::new(2, 3));
        assert_eq!(grid_layout(9, Horizontal), GridLayout::new(3, 3));
    }

    #[test]
    fn odd_counts_stretch_last_panel() {
        assert!(spans_two_columns(3, 2));
        assert!(!spans_two_columns(3, 1));
        assert!(!spans_two_columns(4, 3));
    }
}
