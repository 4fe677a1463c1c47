//! Keyboard input handling.
//!
//! Maps key events to [`App`] mutations, and to [`Command`]s for the
//! coordinator when a key asks for data.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] (or a [`Command`] variant) for the action.
//! 2. Add a `KeyCode` match arm in [`handle_key_event`].
//! 3. Update the help text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Requests the main loop forwards to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    LoadMore,
}

/// Process a single key event.
///
/// Only key presses count, so holding a key or releasing it does not
/// trigger extra actions.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => {
            if app.select_next() && !app.reached_end {
                return Some(Command::LoadMore);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') | KeyCode::F(5) => return Some(Command::Refresh),
        KeyCode::Char('x') => app.dismiss_toast(),
        KeyCode::Char('l') => app.toggle_logs(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};
    use livefeed::logging::LogBuffer;
    use livefeed::{FeedEvent, Presenter};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(count: usize) -> App {
        let mut app = App::new(LogBuffer::new());
        app.present(FeedEvent::DataUpdated(count));
        app
    }

    #[test]
    fn q_and_esc_quit() {
        let mut app = app_with(0);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);

        let mut app = app_with(0);
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.quit);
    }

    #[test]
    fn r_requests_refresh() {
        let mut app = app_with(1);
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('r'))), Some(Command::Refresh));
    }

    #[test]
    fn scrolling_past_bottom_requests_more() {
        let mut app = app_with(1);
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Down)), None);
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Down)), Some(Command::LoadMore));
    }

    #[test]
    fn no_more_requests_after_end_of_feed() {
        let mut app = app_with(1);
        app.present(FeedEvent::DidGetMorePosts { has_new_items: false });
        app.select_last();
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('j'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let mut app = app_with(1);
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(handle_key_event(&mut app, release), None);
        assert!(!app.quit);
    }

    #[test]
    fn l_toggles_log_pane() {
        let mut app = app_with(0);
        handle_key_event(&mut app, press(KeyCode::Char('l')));
        assert!(app.show_logs);
        handle_key_event(&mut app, press(KeyCode::Char('l')));
        assert!(!app.show_logs);
    }
}
