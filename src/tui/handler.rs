use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToTop,
    RefreshFeed,
    ToggleFilter,
    EditKeywords,
    ExportHtml,
    ShowHelp,
    HideHelp,
    // Keyword editing actions
    KeywordChar(char),
    KeywordNewline,
    KeywordBackspace,
    KeywordDone,
}

pub fn handle_key_event(key: KeyEvent, keyword_editing: bool, show_help: bool) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    // Ctrl-C always quits, even mid-edit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    // Keyword editing mode
    if keyword_editing {
        return match key.code {
            KeyCode::Esc => Some(AppAction::KeywordDone),
            KeyCode::Enter => Some(AppAction::KeywordNewline),
            KeyCode::Backspace => Some(AppAction::KeywordBackspace),
            KeyCode::Char(c) => Some(AppAction::KeywordChar(c)),
            _ => None,
        };
    }

    // Normal mode
    match key.code {
        KeyCode::Char('q') => Some(AppAction::Quit),

        KeyCode::Char('j') | KeyCode::Down => Some(AppAction::ScrollDown),
        KeyCode::Char('k') | KeyCode::Up => Some(AppAction::ScrollUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(AppAction::PageDown),
        KeyCode::PageUp => Some(AppAction::PageUp),
        KeyCode::Char('<') | KeyCode::Home => Some(AppAction::ScrollToTop),

        KeyCode::Char('r') => Some(AppAction::RefreshFeed),
        KeyCode::Char('f') => Some(AppAction::ToggleFilter),
        KeyCode::Char('e') => Some(AppAction::EditKeywords),
        KeyCode::Char('w') => Some(AppAction::ExportHtml),

        KeyCode::Char('?') => Some(AppAction::ShowHelp),

        _ => None,
    }
}
