use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::{eyre::WrapErr, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use slurmlens::app::App;
use slurmlens::args::{Args, Command, DashboardArgs};
use slurmlens::commands;
use slurmlens::event::{Event, EventHandler};
use slurmlens::handler::{handle_key_events, handle_mouse_events};
use slurmlens::slurm::{Scheduler, SystemRunner};
use slurmlens::tui::Tui;
use slurmlens::ui::UI;

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    if args.version {
        println!("slurmlens v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match &args.command {
        None => dashboard(&args, &DashboardArgs::default()),
        Some(Command::Dashboard(cmd)) => dashboard(&args, cmd),
        Some(command) => {
            color_eyre::install()?;
            init_logging(args.log_file.as_deref(), true)?;

            commands::run(&SystemRunner, &args, command, io::stdout().lock())
        }
    }
}

/// Logs to `log_file` if given, otherwise to stderr when `stderr` is set
fn init_logging(log_file: Option<&Path>, stderr: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slurmlens=info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None if stderr => registry
            .with(fmt::layer().with_writer(io::stderr))
            .init(),
        None => {}
    }

    Ok(())
}

fn dashboard(args: &Args, cmd: &DashboardArgs) -> Result<()> {
    // The dashboard itself is drawn on stderr
    init_logging(args.log_file.as_deref(), false)?;

    let mut app = App::new(Scheduler::new(args.programs()), cmd.interval)?;
    let mut ui = UI::new(&app);

    // Initialize the terminal user interface
    let mut tui = Tui::new(EventHandler::new(50))?;
    tui.init()?;
    tui.draw(&mut ui)?;

    // Main loop
    while app.running {
        let redraw = match tui.events.next()? {
            Event::Tick => {
                if app.tick()? {
                    ui.update(&app);
                    true
                } else {
                    false
                }
            }
            Event::Key(key_event) => handle_key_events(key_event, &mut app, &mut ui)?,
            Event::Mouse(mouse_event) => handle_mouse_events(mouse_event, &mut ui)?,
            Event::Resize(_, _) => true,
        };

        if redraw {
            tui.draw(&mut ui)?;
        }
    }

    tui.exit()
}
