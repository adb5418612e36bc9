use std::{fmt::Debug, rc::Rc};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Stylize},
    text::Text,
    widgets::{StatefulWidgetRef, TableState},
};

use crate::slurm::{Cluster, ClusterNode, Node, PartitionGroup};

use super::{
    misc::{mb_to_string, right_align_text, scroll},
    table::{GenericTable, GenericTableState},
};

#[derive(Clone, Debug)]
enum NodeRow {
    Spacing,
    Partition(Rc<PartitionGroup>),
    Node(Rc<PartitionGroup>, Rc<ClusterNode>),
}

/// A partition, or a node listed under a partition
#[derive(Clone, Debug)]
pub enum Selection {
    Partition(Rc<PartitionGroup>),
    Node(Rc<PartitionGroup>, Rc<ClusterNode>),
}

impl Selection {
    fn partition(&self) -> &str {
        match self {
            Selection::Partition(partition) | Selection::Node(partition, _) => &partition.name,
        }
    }

    fn matches(&self, row: &NodeRow) -> bool {
        match (self, row) {
            (Selection::Partition(a), NodeRow::Partition(b)) => a.name == b.name,
            (Selection::Node(pa, a), NodeRow::Node(pb, b)) => {
                pa.name == pb.name && a.node.name == b.node.name
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Column {
    Node,
    State,
    Users,
    Jobs,
    CPUs,
    Memory,
    GPUs,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self, f)
    }
}

#[derive(Debug)]
pub struct NodeTableState {
    /// Does this widget have focus?
    focus: bool,
    /// Should unavailable nodes be hidden?
    hide_unavailable: bool,
    /// Visible columns
    columns: Vec<Column>,
    table: TableState,
    cluster: Rc<Cluster>,
    /// Partitions followed by their nodes, separated by empty rows
    rows: Vec<NodeRow>,
    /// Total number of GPUs
    gpus: usize,
}

impl GenericTableState<Column> for NodeTableState {
    fn focus(&self) -> bool {
        self.focus
    }

    fn nrows(&self) -> usize {
        self.rows.len()
    }

    fn columns(&self) -> &[Column] {
        if self.gpus > 0 {
            &self.columns
        } else {
            &self.columns[..self.columns.len() - 1]
        }
    }

    fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    fn variable_width(&self, column: Column) -> bool {
        matches!(column, Column::State)
    }

    fn text<'a>(&self, row: usize, column: Column) -> Text<'a> {
        match &self.rows[row] {
            NodeRow::Partition(partition) => partition_text(partition, column),
            NodeRow::Node(_, node) => {
                let last =
                    row + 1 == self.rows.len() || matches!(self.rows[row + 1], NodeRow::Spacing);

                node_text(node, column, last)
            }
            NodeRow::Spacing => Text::default(),
        }
    }

    fn inner_state(&mut self) -> &mut TableState {
        &mut self.table
    }
}

impl NodeTableState {
    pub fn focus(&mut self, focus: bool) {
        self.focus = focus;
    }

    pub fn scroll(&mut self, mut delta: isize) -> Option<Selection> {
        // Skip across spacing elements
        while let Some(idx) = scroll(&mut self.table, self.rows.len(), delta) {
            if !matches!(self.rows[idx], NodeRow::Spacing)
                || delta == 0
                || (delta < 0 && idx == 0)
                || (delta > 0 && idx + 1 >= self.rows.len())
            {
                break;
            }

            delta = delta.clamp(-1, 1);
        }

        self.selected()
    }

    pub fn selected(&self) -> Option<Selection> {
        match self.rows.get(self.table.selected()?)? {
            NodeRow::Partition(partition) => Some(Selection::Partition(partition.clone())),
            NodeRow::Node(partition, node) => {
                Some(Selection::Node(partition.clone(), node.clone()))
            }
            NodeRow::Spacing => None,
        }
    }

    pub fn click(&mut self, row: usize) {
        // -1 for the header row
        let offset = self.table.offset().saturating_add(row).saturating_sub(1);
        if let Some(selection) = self.rows.get(offset) {
            if !matches!(selection, NodeRow::Spacing) {
                self.table.select(Some(offset));
            }
        }
    }

    pub fn toggle_unavailable(&mut self) {
        let selection = self.selected();
        self.hide_unavailable = !self.hide_unavailable;
        self.update_table();
        self.select(selection)
    }

    pub fn update(&mut self, cluster: Rc<Cluster>) {
        let selection = self.selected();
        self.gpus = cluster.partitions.iter().map(|p| p.gpus()).sum();
        self.cluster = cluster;
        self.update_table();
        self.select(selection);
    }

    fn update_table(&mut self) {
        self.rows.clear();

        for partition in &self.cluster.partitions {
            self.rows.push(NodeRow::Partition(partition.clone()));

            for node in &partition.nodes {
                if !self.hide_unavailable || node.node.is_available() {
                    self.rows.push(NodeRow::Node(partition.clone(), node.clone()));
                }
            }

            self.rows.push(NodeRow::Spacing);
        }

        // Remove trailing spacing
        self.rows.pop();
    }

    /// Re-selects the same node or partition after the rows have changed
    fn select(&mut self, selection: Option<Selection>) {
        let idx = selection.and_then(|selection| {
            self.rows
                .iter()
                .position(|row| selection.matches(row))
                // Fall back to selecting the same partition
                .or_else(|| {
                    self.rows.iter().position(|row| {
                        matches!(row, NodeRow::Partition(p) if p.name == selection.partition())
                    })
                })
        });

        self.table.select(idx)
    }

    pub fn height(&self) -> u16 {
        self.rows.len() as u16 + 1 // +1 for headers
    }
}

impl Default for NodeTableState {
    fn default() -> Self {
        Self {
            focus: false,
            hide_unavailable: false,
            columns: vec![
                Column::Node,
                Column::State,
                Column::Users,
                Column::Jobs,
                Column::CPUs,
                Column::Memory,
                Column::GPUs,
            ],
            table: TableState::default(),
            cluster: Rc::default(),
            rows: Vec::default(),
            gpus: 0,
        }
    }
}

fn partition_text<'a>(partition: &PartitionGroup, column: Column) -> Text<'a> {
    match column {
        Column::Node => Text::from(partition.name.clone()).bold(),
        Column::State => {
            let available = partition
                .nodes
                .iter()
                .filter(|n| n.node.is_available())
                .count();

            Text::from(format!("{}/{} available", available, partition.nodes.len())).dim()
        }
        Column::Users => right_align_text(partition.users()),
        Column::Jobs => right_align_text(partition.jobs.len()),
        Column::CPUs => right_align_text(partition.cpus()),
        Column::Memory => right_align_text(mb_to_string(partition.memory())),
        Column::GPUs => right_align_text(partition.gpus()),
    }
}

fn node_text<'a>(node: &ClusterNode, column: Column, last: bool) -> Text<'a> {
    match column {
        Column::Node => Text::from(format!(
            " {} {}",
            if last { "┕" } else { "┝" },
            node.node.name
        )),
        Column::State => color_state_text(&node.node),
        Column::Users => right_align_text(node.users()),
        Column::Jobs => right_align_text(node.jobs.len()),
        Column::CPUs => right_align_text(node.node.cpus),
        Column::Memory => right_align_text(mb_to_string(node.node.memory)),
        Column::GPUs => right_align_text(node.node.gpus()),
    }
}

/// Colorize a node state based on availability
fn color_state_text<'a>(node: &Node) -> Text<'a> {
    let text = Text::from(node.state.clone());

    if node.is_available() && node.responds() {
        text.dim()
    } else {
        text.fg(Color::Red)
    }
}

#[derive(Debug, Default)]
pub struct NodeTable {}

impl StatefulWidgetRef for NodeTable {
    type State = NodeTableState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let table = GenericTable::<Column, NodeTableState>::new();

        table.render_ref(area, buf, state);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::slurm::{parse_nodes, Parsed, RowGrammar};

    fn cluster(text: &str) -> Rc<Cluster> {
        let nodes = parse_nodes(Cursor::new(text), &RowGrammar::nodes()).unwrap();

        Rc::new(Cluster::collect(nodes, Parsed::default()))
    }

    const NODES: &str = "\
cn01 all idle 1000 4 1 4 1 (null)
cn02 all down* 1000 4 1 4 1 (null)
cn01 short idle 1000 4 1 4 1 (null)
";

    #[test]
    fn test_rows_and_scrolling() {
        let mut state = NodeTableState::default();
        state.update(cluster(NODES));

        // all, cn01, cn02, spacing, short, cn01
        assert_eq!(state.nrows(), 6);
        assert_eq!(state.columns().len(), 6);

        assert!(matches!(state.scroll(0), Some(Selection::Partition(p)) if p.name == "all"));
        assert!(matches!(state.scroll(2), Some(Selection::Node(_, n)) if n.node.name == "cn02"));
        // The spacing row is skipped
        assert!(matches!(state.scroll(1), Some(Selection::Partition(p)) if p.name == "short"));
    }

    #[test]
    fn test_selection_survives_hiding() {
        let mut state = NodeTableState::default();
        state.update(cluster(NODES));
        state.scroll(2);

        state.toggle_unavailable();
        assert_eq!(state.nrows(), 5);
        assert!(matches!(state.selected(), Some(Selection::Partition(p)) if p.name == "all"));

        state.scroll(4);
        state.update(cluster(NODES));
        assert!(matches!(
            state.selected(),
            Some(Selection::Node(p, n)) if p.name == "short" && n.node.name == "cn01"
        ));
    }
}
