use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{Input, Key, TextArea};

/// Event emitted by the search input widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInputEvent {
    None,
    /// The text changed; the caller debounces before applying it.
    Changed,
    /// Enter pressed: apply the query immediately.
    Submit,
    /// Esc pressed: leave the input without applying.
    Cancel,
}

/// Single-line search input wrapping tui-textarea.
pub struct SearchInput {
    textarea: TextArea<'static>,
    value: String,
    focused: bool,
}

impl SearchInput {
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_text("Search");
        let mut widget = Self {
            textarea,
            value: String::new(),
            focused: false,
        };
        widget.set_focused(false);
        widget
    }

    /// Show or hide the cursor. Setting the cursor style equal to the text
    /// style hides it (per tui-textarea docs).
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.textarea
                .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        } else {
            let style = self.textarea.style();
            self.textarea.set_cursor_style(style);
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        let single_line = value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line.clone()]);
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea.set_placeholder_text("Search");
        use tui_textarea::CursorMove;
        self.textarea.move_cursor(CursorMove::End);
        self.value = single_line;
        let focused = self.focused;
        self.set_focused(focused);
    }

    /// Handle a key event while the input is focused.
    pub fn handle_key(&mut self, event: &KeyEvent) -> SearchInputEvent {
        match event.code {
            KeyCode::Enter => return SearchInputEvent::Submit,
            KeyCode::Esc => return SearchInputEvent::Cancel,
            _ => {}
        }
        let input = key_event_to_input(event);
        if matches!(input.key, Key::Char('\n') | Key::Char('\r')) {
            return SearchInputEvent::None;
        }
        let before = self.value.clone();
        self.textarea.input(input);
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
        if self.value != before {
            SearchInputEvent::Changed
        } else {
            SearchInputEvent::None
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &SearchInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}

fn key_event_to_input(event: &KeyEvent) -> Input {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    };

    Input {
        key,
        ctrl,
        alt,
        shift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn typing_emits_changed() {
        let mut input = SearchInput::new();
        assert_eq!(input.handle_key(&key('a')), SearchInputEvent::Changed);
        assert_eq!(input.handle_key(&key('b')), SearchInputEvent::Changed);
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn enter_submits_and_esc_cancels() {
        let mut input = SearchInput::new();
        input.handle_key(&key('x'));
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(input.handle_key(&enter), SearchInputEvent::Submit);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(input.handle_key(&esc), SearchInputEvent::Cancel);
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn backspace_changes_value() {
        let mut input = SearchInput::new();
        input.set_value("ab".to_string());
        let backspace = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.handle_key(&backspace), SearchInputEvent::Changed);
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn set_value_flattens_newlines() {
        let mut input = SearchInput::new();
        input.set_value("a\nb".to_string());
        assert_eq!(input.value(), "a b");
    }
}
