use std::{cmp::Ordering, fmt::Debug, rc::Rc};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Stylize},
    symbols::border,
    text::Text,
    widgets::{Block, Borders, StatefulWidgetRef, TableState, Widget},
};

use crate::slurm::Job;

use super::{
    misc::{center_layout, right_align_text, scroll},
    table::{GenericTable, GenericTableState, SortOrder},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Column {
    JobID,
    User,
    Account,
    State,
    CPUs,
    Partition,
    QOS,
    Nodelist,
    Reason,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self, f)
    }
}

impl Column {
    fn compare(self, a: &Job, b: &Job) -> Ordering {
        match self {
            Column::JobID => natural_cmp(&a.id, &b.id),
            Column::User => a.user.cmp(&b.user),
            Column::Account => a.account.cmp(&b.account),
            Column::State => a.state.cmp(&b.state),
            Column::CPUs => natural_cmp(&a.cpus, &b.cpus),
            Column::Partition => a.partition.cmp(&b.partition),
            Column::QOS => a.qos.cmp(&b.qos),
            Column::Nodelist => a.nodelist.cmp(&b.nodelist),
            Column::Reason => a.reason.cmp(&b.reason),
        }
    }
}

#[derive(Debug)]
pub struct JobTableState {
    focus: bool,
    table: TableState,
    jobs: Vec<Rc<Job>>,
    columns: Vec<Column>,
    sort_column: usize,
    sort_order: SortOrder,
}

impl JobTableState {
    pub fn focus(&mut self, focus: bool) {
        self.focus = focus;
    }

    pub fn update(&mut self, jobs: &[Rc<Job>]) {
        self.jobs.clear();
        self.jobs.extend_from_slice(jobs);
        self.sort();

        // Update/clear job selection depending on the new contents
        self.scroll(0);
    }

    pub fn scroll(&mut self, delta: isize) {
        scroll(&mut self.table, self.jobs.len(), delta);
    }

    pub fn click(&mut self, row: usize) {
        let offset = self.table.offset().saturating_add(row);
        self.table.select(Some(offset.saturating_sub(1)));
    }

    /// Moves the sort column `delta` columns to the left or right
    pub fn set_sort_column(&mut self, delta: isize) {
        let columns = self.columns.len() as isize;
        self.sort_column = (self.sort_column as isize + delta).rem_euclid(columns) as usize;
        self.sort();
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggle();
        self.sort();
    }

    fn sort(&mut self) {
        let column = self.columns[self.sort_column];
        let order = self.sort_order;

        self.jobs.sort_by(|a, b| {
            order.apply(
                column
                    .compare(a, b)
                    .then_with(|| natural_cmp(&a.id, &b.id)),
            )
        });
    }
}

impl Default for JobTableState {
    fn default() -> Self {
        Self {
            focus: false,
            columns: vec![
                Column::JobID,
                Column::User,
                Column::Account,
                Column::State,
                Column::CPUs,
                Column::Partition,
                Column::QOS,
                Column::Nodelist,
                Column::Reason,
            ],
            table: TableState::default(),
            jobs: Vec::default(),
            sort_column: 0,
            sort_order: SortOrder::default(),
        }
    }
}

impl GenericTableState<Column> for JobTableState {
    fn focus(&self) -> bool {
        self.focus
    }

    fn nrows(&self) -> usize {
        self.jobs.len()
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn sort_column(&self) -> Option<Column> {
        self.columns.get(self.sort_column).copied()
    }

    fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    fn variable_width(&self, column: Column) -> bool {
        matches!(column, Column::Reason)
    }

    fn text<'a>(&self, row: usize, column: Column) -> Text<'a> {
        let job = &self.jobs[row];
        let text = match column {
            Column::JobID => job.id.clone().into(),
            Column::User => job.user.clone().into(),
            Column::Account => job.account.clone().into(),
            Column::State => job.state.clone().into(),
            Column::CPUs => right_align_text(&job.cpus),
            Column::Partition => job.partition.clone().into(),
            Column::QOS => job.qos.clone().into(),
            Column::Nodelist => job.nodelist.clone().into(),
            Column::Reason => job.reason.clone().into(),
        };

        if job.is_running() {
            text
        } else {
            text.fg(Color::Gray)
        }
    }

    fn inner_state(&mut self) -> &mut TableState {
        &mut self.table
    }
}

#[derive(Debug, Default)]
pub struct JobTable {}

impl JobTable {
    // Renders a simple notification that there are no displayable jobs
    fn render_empty_table(area: Rect, buf: &mut Buffer) {
        let label = "No jobs found";
        // Size of label + surrounding border
        let width = label.chars().count() as u16 + 2;
        let height = 3;

        if let Some(area) = center_layout(area, width, height) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_set(border::PLAIN);

            Text::from(label).render(block.inner(area), buf);
            block.render(area, buf);
        }
    }
}

impl StatefulWidgetRef for JobTable {
    type State = JobTableState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if state.jobs.is_empty() {
            Self::render_empty_table(area, buf)
        } else {
            let table = GenericTable::<Column, JobTableState>::new();

            table.render_ref(area, buf, state);
        }
    }
}

/// Compares strings by their leading number, if any, so that `9` sorts before `10`
fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn leading_number(value: &str) -> Option<u64> {
        let end = value
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(value.len());

        value[..end].parse().ok()
    }

    match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, user: &str) -> Rc<Job> {
        Rc::new(Job {
            id: id.into(),
            state: "RUNNING".into(),
            user: user.into(),
            account: String::new(),
            cpus: "1".into(),
            nodelist: String::new(),
            partition: "p1".into(),
            qos: "normal".into(),
            reason: "None".into(),
        })
    }

    fn ids(state: &JobTableState) -> Vec<&str> {
        state.jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("1234_7", "1235"), Ordering::Less);
        assert_eq!(natural_cmp("4-8", "12"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn test_sorting() {
        let mut state = JobTableState::default();
        state.update(&[job("9", "bob"), job("10", "alice"), job("100", "carol")]);

        // Newest jobs first by default
        assert_eq!(ids(&state), vec!["100", "10", "9"]);
        assert_eq!(state.sort_column(), Some(Column::JobID));

        state.set_sort_column(1);
        state.toggle_sort_order();
        assert_eq!(state.sort_column(), Some(Column::User));
        assert_eq!(state.sort_order(), SortOrder::Ascending);
        assert_eq!(ids(&state), vec!["10", "9", "100"]);

        state.set_sort_column(-2);
        assert_eq!(state.sort_column(), Some(Column::Reason));
    }

    #[test]
    fn test_selection_is_cleared_without_jobs() {
        let mut state = JobTableState::default();
        state.update(&[job("1", "alice")]);
        assert_eq!(state.selected(), Some(0));

        state.update(&[]);
        assert_eq!(state.selected(), None);
    }
}
