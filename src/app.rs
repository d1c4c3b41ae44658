use ratatui::layout::Rect;
use portfolio_chat::{ChatSession, SessionState, EXAMPLE_QUESTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Chat session and the last state it published
    pub session: ChatSession,
    pub chat: SessionState,

    // Input cursor, in characters
    pub input_cursor: usize,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_lines: u16,  // Wrapped row count of the conversation, measured at render
    pub follow_tail: bool, // Keep the newest text in view while streaming

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(session: ChatSession) -> Self {
        let chat = session.snapshot();
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session,
            chat,
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_lines: 0,
            follow_tail: true,
            animation_frame: 0,
            chat_area: None,
        }
    }

    /// Pull the latest session state (called on every Chat event)
    pub fn sync_chat(&mut self) {
        self.chat = self.session.snapshot();
        let char_count = self.chat.input_value.chars().count();
        self.input_cursor = self.input_cursor.min(char_count);
        if self.follow_tail {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
        self.session.teardown();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing. The session owns the input text; the cursor lives here.
    pub fn insert_char(&mut self, c: char) {
        let mut input = self.chat.input_value.clone();
        input.insert(char_to_byte_index(&input, self.input_cursor), c);
        self.input_cursor += 1;
        self.set_input(input);
    }

    pub fn delete_before_cursor(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        self.input_cursor -= 1;
        let mut input = self.chat.input_value.clone();
        input.remove(char_to_byte_index(&input, self.input_cursor));
        self.set_input(input);
    }

    pub fn delete_at_cursor(&mut self) {
        let mut input = self.chat.input_value.clone();
        if self.input_cursor < input.chars().count() {
            input.remove(char_to_byte_index(&input, self.input_cursor));
            self.set_input(input);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.chat.input_value.chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.chat.input_value.chars().count();
    }

    fn set_input(&mut self, input: String) {
        self.session.set_input(&input);
        self.chat.input_value = input;
    }

    // Chat actions
    pub fn submit(&mut self) -> bool {
        let accepted = self.session.submit_input();
        if accepted {
            self.after_submit();
        }
        accepted
    }

    /// Submit one of the preset questions (1-based, as shown on screen).
    pub fn submit_example(&mut self, number: usize) -> bool {
        let Some(question) = number.checked_sub(1).and_then(|i| EXAMPLE_QUESTIONS.get(i)) else {
            return false;
        };
        let accepted = self.session.submit_example(question);
        if accepted {
            self.after_submit();
        }
        accepted
    }

    fn after_submit(&mut self) {
        self.input_cursor = 0;
        self.follow_tail = true;
        self.sync_chat();
    }

    pub fn toggle_fullscreen(&mut self) {
        self.session.toggle_fullscreen();
        self.sync_chat();
    }

    // Chat scrolling
    pub fn scroll_down(&mut self) {
        let max_scroll = self.max_chat_scroll();
        if self.chat_scroll < max_scroll {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
        self.follow_tail = self.chat_scroll >= max_scroll;
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
        self.follow_tail = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.visible_height() / 2;
        let max_scroll = self.max_chat_scroll();
        self.chat_scroll = (self.chat_scroll + half_page).min(max_scroll);
        self.follow_tail = self.chat_scroll >= max_scroll;
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.visible_height() / 2;
        self.chat_scroll = self.chat_scroll.saturating_sub(half_page);
        self.follow_tail = false;
    }

    /// Scroll chat to bottom so the newest text is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_chat_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.visible_height())
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
