use std::fmt::Display;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::Text,
    widgets::TableState,
};

pub const COLUMN_SPACING: u16 = 2;

/// Moves the selection by `delta` rows, clamped to the available rows
pub fn scroll(state: &mut TableState, items: usize, delta: isize) -> Option<usize> {
    let selection = match items {
        0 => None,
        _ => {
            let current = state.selected().unwrap_or_default() as isize;
            Some(current.saturating_add(delta).clamp(0, items as isize - 1) as usize)
        }
    };

    state.select(selection);
    selection
}

pub fn right_align_text<'a, T: Display>(v: T) -> Text<'a> {
    Text::from(v.to_string()).alignment(Alignment::Right)
}

/// Creates a `height`/`width` Rect centered in the specified `area`
pub fn center_layout(area: Rect, width: u16, height: u16) -> Option<Rect> {
    if width > area.width || height > area.height {
        return None;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Length((area.width - width) / 2),
            Constraint::Length(width),
        ])
        .split(rows[1]);

    Some(columns[1])
}

/// Formats an amount of memory reported by `sinfo` in megabytes
pub fn mb_to_string(mb: u64) -> String {
    if mb < 1024 {
        format!("{}M", mb)
    } else if mb < 1048576 {
        format!("{:.1}G", mb as f64 / 1024.0)
    } else {
        format!("{:.1}T", mb as f64 / 1048576.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll() {
        let mut state = TableState::default();

        assert_eq!(scroll(&mut state, 0, 1), None);
        assert_eq!(scroll(&mut state, 5, 0), Some(0));
        assert_eq!(scroll(&mut state, 5, 3), Some(3));
        assert_eq!(scroll(&mut state, 5, isize::MAX), Some(4));
        assert_eq!(scroll(&mut state, 5, isize::MIN), Some(0));
        assert_eq!(scroll(&mut state, 2, -1), Some(0));
    }

    #[test]
    fn test_mb_to_string() {
        assert_eq!(mb_to_string(0), "0M");
        assert_eq!(mb_to_string(1000), "1000M");
        assert_eq!(mb_to_string(2048), "2.0G");
        assert_eq!(mb_to_string(1572864), "1.5T");
    }

    #[test]
    fn test_center_layout() {
        let area = Rect::new(0, 0, 20, 10);

        let centered = center_layout(area, 10, 4).unwrap();
        assert_eq!((centered.x, centered.y), (5, 3));
        assert_eq!(center_layout(area, 30, 4), None);
    }
}
