mod jobs;
mod misc;
mod nodes;
mod table;

pub use jobs::{JobTable, JobTableState};
pub use nodes::{NodeTable, NodeTableState, Selection};
