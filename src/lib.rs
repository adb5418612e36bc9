/// Slurm accounting associations
pub mod accounting;
/// Dashboard application state
pub mod app;
/// Command-line arguments
pub mod args;
/// Non-interactive subcommands
pub mod commands;
/// Terminal events handler
pub mod event;
/// Event handler.
pub mod handler;
/// JSON output and paging
pub mod output;
/// Querying of Slurm state
pub mod slurm;
/// Terminal user interface
pub mod tui;
/// Widget renderer
pub mod ui;
pub mod utilities;
/// Custom widgets
pub mod widgets;
