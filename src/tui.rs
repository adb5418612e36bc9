use std::io::{self, Stderr};
use std::panic;

use color_eyre::{config::HookBuilder, eyre, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::event::EventHandler;
use crate::ui::UI;

/// Representation of a terminal user interface drawn on stderr.
///
/// It is responsible for setting up the terminal,
/// initializing the interface and handling the draw events.
#[derive(Debug)]
pub struct Tui {
    /// Interface to the Terminal.
    terminal: Terminal<CrosstermBackend<Stderr>>,
    /// Terminal event handler.
    pub events: EventHandler,
}

impl Tui {
    pub fn new(events: EventHandler) -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;

        Ok(Self { terminal, events })
    }

    /// Initializes the terminal interface.
    ///
    /// It enables the raw mode and sets terminal properties. Panic and error hooks
    /// restore the terminal before reporting.
    pub fn init(&mut self) -> Result<()> {
        let (panic_hook, eyre_hook) = HookBuilder::default().into_hooks();
        let panic_hook = panic_hook.into_panic_hook();
        panic::set_hook(Box::new(move |panic| {
            if let Err(err) = Self::reset() {
                eprintln!("failed to reset the terminal: {}", err);
            }

            panic_hook(panic);
        }));

        let eyre_hook = eyre_hook.into_eyre_hook();
        eyre::set_hook(Box::new(
            move |error: &(dyn std::error::Error + 'static)| {
                if let Err(err) = Self::reset() {
                    eprintln!("failed to reset the terminal: {}", err);
                }

                eyre_hook(error)
            },
        ))?;

        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    /// [`Draw`] the terminal interface by [`rendering`] the widgets.
    ///
    /// [`Draw`]: ratatui::Terminal::draw
    /// [`rendering`]: crate::ui::UI::render
    pub fn draw(&mut self, ui: &mut UI) -> Result<()> {
        self.terminal
            .draw(|frame| ui.render(frame.area(), frame.buffer_mut()))?;

        Ok(())
    }

    fn reset() -> Result<()> {
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }

    /// Exits the terminal interface.
    ///
    /// It disables the raw mode and reverts back the terminal properties.
    pub fn exit(&mut self) -> Result<()> {
        Self::reset()?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
