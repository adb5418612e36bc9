use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::slurm::CommandRunner;
use crate::ui::UI;

/// Dashboard commands bound to keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleUnavailable,
    Refresh,
    Scroll(isize),
    SortColumn(isize),
    ToggleSortOrder,
    ToggleFocus,
}

impl Action {
    pub fn from_key(key_event: KeyEvent) -> Option<Action> {
        let action = match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
            KeyCode::Char('c') | KeyCode::Char('C')
                if key_event.modifiers == KeyModifiers::CONTROL =>
            {
                Action::Quit
            }
            KeyCode::Char('h') | KeyCode::Char('H') => Action::ToggleUnavailable,
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Refresh,
            KeyCode::Home => Action::Scroll(isize::MIN),
            KeyCode::PageUp => Action::Scroll(-10),
            KeyCode::Up => Action::Scroll(-1),
            KeyCode::Down => Action::Scroll(1),
            KeyCode::PageDown => Action::Scroll(10),
            KeyCode::End => Action::Scroll(isize::MAX),
            KeyCode::Left => Action::SortColumn(-1),
            KeyCode::Right => Action::SortColumn(1),
            KeyCode::Char('s') | KeyCode::Char('S') => Action::ToggleSortOrder,
            KeyCode::Tab | KeyCode::BackTab => Action::ToggleFocus,
            _ => return None,
        };

        Some(action)
    }
}

/// Handles the key events and updates the state of [`App`]; returns true if a redraw is needed
pub fn handle_key_events<R>(key_event: KeyEvent, app: &mut App<R>, ui: &mut UI) -> Result<bool>
where
    R: CommandRunner,
{
    let Some(action) = Action::from_key(key_event) else {
        return Ok(false);
    };

    match action {
        Action::Quit => app.quit(),
        Action::ToggleUnavailable => ui.toggle_unavailable(),
        Action::Refresh => {
            if !app.update(1)? {
                return Ok(false);
            }

            ui.update(app);
        }
        Action::Scroll(delta) => ui.scroll(delta),
        Action::SortColumn(delta) => ui.set_sort_column(delta),
        Action::ToggleSortOrder => ui.toggle_sort_order(),
        Action::ToggleFocus => ui.toggle_focus(),
    }

    Ok(true)
}

pub fn handle_mouse_events(event: MouseEvent, ui: &mut UI) -> Result<bool> {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => ui.mouse_click(event.row),
        MouseEventKind::ScrollUp => ui.mouse_wheel(event.row, -1),
        MouseEventKind::ScrollDown => ui.mouse_wheel(event.row, 1),
        _ => return Ok(false),
    }

    Ok(true)
}
