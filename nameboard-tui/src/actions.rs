use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    NextTab,
    ShowBoard,
    ShowMentions,
    FocusNext,
    FocusPrev,
    SelectNext,
    SelectPrev,
    Register,
    Bind,
    Logout,
    NewShow,
    Search,
    ResetSearch,
    Comment,
    Viewer,
    None,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Tab => Action::NextTab,
            KeyCode::Char('1') => Action::ShowBoard,
            KeyCode::Char('2') => Action::ShowMentions,
            KeyCode::Left => Action::FocusPrev,
            KeyCode::Right => Action::FocusNext,
            KeyCode::Up => Action::SelectPrev,
            KeyCode::Down => Action::SelectNext,
            KeyCode::Char('g') => Action::Register,
            KeyCode::Char('b') => Action::Bind,
            KeyCode::Char('l') => Action::Logout,
            KeyCode::Char('n') => Action::NewShow,
            KeyCode::Char('s') | KeyCode::Char('/') => Action::Search,
            KeyCode::Char('x') => Action::ResetSearch,
            KeyCode::Char('c') => Action::Comment,
            KeyCode::Char('v') => Action::Viewer,
            _ => Action::None,
        }
    }
}

pub const HELP: &[(&str, &str)] = &[
    ("q", "quit"),
    ("r", "refresh"),
    ("tab/1/2", "switch tab"),
    ("g", "register"),
    ("b", "bind user_id"),
    ("l", "log out"),
    ("n", "new show"),
    ("s", "search"),
    ("x", "clear search"),
    ("c", "comment"),
    ("v", "viewer name"),
    ("arrows", "navigate"),
];
