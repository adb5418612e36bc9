use std::{cmp::Ordering, fmt::Display, marker::PhantomData};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Stylize,
    text::Text,
    widgets::{
        Row, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, StatefulWidgetRef,
        Table, TableState,
    },
};

use super::misc::COLUMN_SPACING;

/// User selected sort order of columns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn toggle(self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// Applies this order to an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    fn marker(self) -> &'static str {
        match self {
            SortOrder::Ascending => " ▲",
            SortOrder::Descending => " ▼",
        }
    }
}

pub trait GenericTableState<C>
where
    C: Copy + Display + PartialEq + Sized,
{
    fn focus(&self) -> bool;

    fn nrows(&self) -> usize;

    fn columns(&self) -> &[C];

    /// The column used for sorting, if the table is sortable
    fn sort_column(&self) -> Option<C> {
        None
    }

    fn sort_order(&self) -> SortOrder {
        SortOrder::default()
    }

    /// Returns the text object for a given row and column
    fn text<'a>(&self, row: usize, column: C) -> Text<'a>;

    /// Returns true if a column should grow to consume available space
    fn variable_width(&self, column: C) -> bool;

    /// Returns TableState object used by the actual table
    fn inner_state(&mut self) -> &mut TableState;

    /// Returns the currently selected item
    fn selected(&self) -> Option<usize>;
}

#[derive(Debug, Default)]
pub struct GenericTable<C, S>
where
    C: Copy + Display + PartialEq + Sized,
    S: GenericTableState<C>,
{
    c: PhantomData<C>,
    s: PhantomData<S>,
}

impl<C, S> GenericTable<C, S>
where
    C: Copy + Display + PartialEq + Sized,
    S: GenericTableState<C>,
{
    pub fn new() -> Self {
        Self {
            c: PhantomData,
            s: PhantomData,
        }
    }

    fn header(state: &S, column: C) -> String {
        let mut label = column.to_string();
        if state.sort_column() == Some(column) {
            label.push_str(state.sort_order().marker());
        }

        label
    }

    /// Widest cell in the column, or None for columns sharing the remaining space
    fn width(state: &S, column: C) -> Option<u16> {
        if state.variable_width(column) {
            return None;
        }

        let width = (0..state.nrows())
            .map(|row| state.text(row, column).width())
            .fold(Self::header(state, column).chars().count(), usize::max);

        Some(width as u16)
    }

    fn constraints(state: &S, area: Rect) -> Vec<Constraint> {
        let widths = state
            .columns()
            .iter()
            .map(|c| Self::width(state, *c))
            .collect::<Vec<_>>();

        let variable_columns = widths.iter().filter(|v| v.is_none()).count() as u16;
        let spacing = (widths.len().saturating_sub(1)) as u16 * COLUMN_SPACING;
        let fixed = spacing + widths.iter().flatten().sum::<u16>();
        let remaining = area.width.saturating_sub(fixed) / variable_columns.max(1);

        widths
            .into_iter()
            .map(|v| Constraint::Length(v.unwrap_or(remaining)))
            .collect()
    }

    /// Draws a scrollbar along the right edge and returns the area left for the table
    fn render_scrollbar(state: &S, area: Rect, buf: &mut Buffer) -> Rect {
        let mut scrollbar = ScrollbarState::default()
            .content_length(state.nrows())
            .position(state.selected().unwrap_or_default());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(100), Constraint::Length(2)])
            .split(area);

        // Skip the header row
        let track = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(1), Constraint::Percentage(100)])
            .split(columns[1]);

        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .track_symbol(None)
            .thumb_symbol("▐")
            .render(track[1], buf, &mut scrollbar);

        columns[0]
    }
}

impl<C, S> StatefulWidgetRef for GenericTable<C, S>
where
    C: Copy + Display + PartialEq + Sized,
    S: GenericTableState<C>,
{
    type State = S;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = Self::render_scrollbar(state, area, buf);
        let constraints = Self::constraints(state, area);

        let rows = (0..state.nrows())
            .map(|idx| {
                let row = Row::new(state.columns().iter().map(|&c| state.text(idx, c)));

                // Reversed rows rather than Table::highlight_style, so that cell colors survive
                if state.selected() == Some(idx) && state.focus() {
                    row.reversed()
                } else {
                    row
                }
            })
            .collect::<Vec<_>>();

        let header = state
            .columns()
            .iter()
            .map(|&c| Self::header(state, c))
            .collect::<Vec<_>>();

        let table = Table::new(rows, constraints)
            .column_spacing(COLUMN_SPACING)
            .header(Row::new(header));

        table.render(area, buf, state.inner_state());
    }
}
