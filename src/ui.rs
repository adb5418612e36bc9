use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Stylize,
    symbols::{self, border},
    text::Line,
    widgets::{Block, Borders, StatefulWidgetRef, Widget},
};

use crate::app::App;
use crate::slurm::CommandRunner;
use crate::widgets::{JobTable, JobTableState, NodeTable, NodeTableState, Selection};

#[derive(Debug, Default, PartialEq, Eq)]
enum Focus {
    #[default]
    Jobs,
    Nodes,
}

#[derive(Debug, Default)]
pub struct UI {
    /// Indicates if the node list or job list has focus
    focus: Focus,
    nodes: NodeTable,
    node_state: NodeTableState,
    /// The last used layout; used to determine mouse-click targets
    node_layout: Rect,
    jobs: JobTable,
    job_state: JobTableState,
    /// Lines of scheduler output that could not be parsed during the last update
    skipped: usize,
}

impl UI {
    pub fn new<R: CommandRunner>(app: &App<R>) -> Self {
        let mut ui = Self::default();
        // Set initial focus on node list
        ui.toggle_focus();
        ui.update(app);
        ui
    }

    pub fn update<R: CommandRunner>(&mut self, app: &App<R>) {
        self.skipped = app.cluster.skipped;
        self.node_state.update(app.cluster.clone());
        self.scroll_node_selection(0);
    }

    pub fn scroll(&mut self, delta: isize) {
        match self.focus {
            Focus::Nodes => self.scroll_node_selection(delta),
            Focus::Jobs => self.scroll_job_selection(delta),
        }
    }

    pub fn set_sort_column(&mut self, delta: isize) {
        self.job_state.set_sort_column(delta);
    }

    pub fn toggle_sort_order(&mut self) {
        self.job_state.toggle_sort_order();
    }

    pub fn mouse_click(&mut self, row: u16) {
        if let Some(focus) = self.focus_at(row) {
            if self.focus != focus {
                self.toggle_focus();
            }

            // -1 for top border
            let row = row.saturating_sub(1);
            match focus {
                Focus::Nodes => {
                    self.node_state.click(row as usize);
                    self.scroll_node_selection(0)
                }
                Focus::Jobs => {
                    self.job_state
                        .click(row.saturating_sub(self.node_layout.height) as usize);
                }
            }
        }
    }

    pub fn mouse_wheel(&mut self, row: u16, delta: isize) {
        match self.focus_at(row) {
            Some(Focus::Jobs) => self.scroll_job_selection(delta),
            Some(Focus::Nodes) => self.scroll_node_selection(delta),
            None => {}
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Jobs => Focus::Nodes,
            Focus::Nodes => Focus::Jobs,
        };

        self.node_state.focus(self.focus == Focus::Nodes);
        self.job_state.focus(self.focus == Focus::Jobs);
    }

    pub fn toggle_unavailable(&mut self) {
        self.node_state.toggle_unavailable();
        self.scroll_node_selection(0)
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        // Require space for at least 4 rows, 2 headers, and 3 borders before rendering both tables
        if area.height >= 2 * (2 + 1) + 3 {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    // +2 for top border and an empty line to clearly indicate the end of the list
                    Constraint::Max((self.node_state.height() + 2).max(5)),
                    Constraint::Min(4),
                ])
                .split(area);

            self.render_nodes(layout[0], buf, Line::default());
            self.render_jobs(layout[1], buf, UI::instructions());
            self.node_layout = layout[0];
        } else {
            self.render_nodes(area, buf, UI::instructions());
            self.node_layout = area;
        }
    }

    fn focus_at(&self, row: u16) -> Option<Focus> {
        if row >= self.node_layout.height && !self.node_layout.is_empty() {
            Some(Focus::Jobs)
        } else if row < self.node_layout.height.saturating_sub(1) {
            Some(Focus::Nodes)
        } else {
            None
        }
    }

    /// Scrolls the node selection and updates the job-list
    fn scroll_node_selection(&mut self, delta: isize) {
        match self.node_state.scroll(delta) {
            Some(Selection::Partition(partition)) => self.job_state.update(&partition.jobs),
            Some(Selection::Node(_, node)) => self.job_state.update(&node.jobs),
            None => self.job_state.update(&[]),
        }
    }

    /// Scrolls the job list
    fn scroll_job_selection(&mut self, delta: isize) {
        self.job_state.scroll(delta)
    }

    fn render_nodes(&mut self, area: Rect, buf: &mut Buffer, instructions: Line) {
        let title = match self.skipped {
            0 => " Partitions ".to_string(),
            n => format!(" Partitions ({} malformed lines ignored) ", n),
        };

        let block = Block::default()
            .title_top(Line::from(title).bold().centered())
            .title_bottom(instructions)
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_set(border::PLAIN);

        self.nodes
            .render_ref(block.inner(area), buf, &mut self.node_state);
        block.render(area, buf);
    }

    fn render_jobs(&mut self, area: Rect, buf: &mut Buffer, instructions: Line) {
        let title = match self.node_state.selected() {
            Some(Selection::Node(partition, node)) => {
                format!(" {} in {} ", node.node.name, partition.name)
            }
            Some(Selection::Partition(partition)) => format!(" {} ", partition.name),
            None => String::default(),
        };

        // Join border with border-less bottom of nodes table
        let border = symbols::border::Set {
            top_left: symbols::line::NORMAL.vertical_right,
            top_right: symbols::line::NORMAL.vertical_left,
            ..symbols::border::PLAIN
        };

        let block = Block::default()
            .title_top(Line::from(title).centered())
            .title_bottom(instructions)
            .borders(Borders::ALL)
            .border_set(border);

        self.jobs
            .render_ref(block.inner(area), buf, &mut self.job_state);
        block.render(area, buf);
    }

    fn instructions() -> Line<'static> {
        Line::from(vec![
            " <H> ".bold(),
            "Hide/Show unavailable".into(),
            " <R> ".bold(),
            "Refresh".into(),
            " <S> ".bold(),
            "Sort order".into(),
            " <←/→> ".bold(),
            "Sort column".into(),
            " <Q> ".bold(),
            "Quit ".into(),
        ])
        .centered()
    }
}
