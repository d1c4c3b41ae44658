use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use portfolio_chat::session::{HEADER_SUBTITLE, HEADER_TITLE, WELCOME_MESSAGE};
use portfolio_chat::{ChatRole, EXAMPLE_QUESTIONS};
use crate::app::{App, InputMode};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            // Push any accumulated plain text
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next(); // consume second *
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal (may still be streaming in)
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    // Push any remaining text
    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Fullscreen drops the header and footer chrome and gives the chat everything
    if app.chat.is_fullscreen {
        render_chat(app, frame, area);
        return;
    }

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_chat(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", HEADER_TITLE), Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let subtitle = Line::from(Span::styled(
        format!(" {}", HEADER_SUBTITLE),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(vec![title, subtitle]).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " CHAT ",
        InputMode::Editing => " TYPE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
            ];
            if app.chat.messages.is_empty() {
                hints.extend(vec![
                    Span::styled(" 1-3 ", key_style),
                    Span::styled(" ask example ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" f ", key_style),
                Span::styled(" fullscreen ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Ctrl-F ", key_style),
            Span::styled(" fullscreen ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn welcome_text() -> Text<'static> {
    let mut lines = vec![
        Line::from(Span::raw(WELCOME_MESSAGE)),
        Line::default(),
        Line::from(Span::styled(
            "Try asking:",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", i + 1),
                Style::default().bg(Color::DarkGray).fg(Color::White),
            ),
            Span::raw(" "),
            Span::styled(*question, Style::default().fg(Color::Cyan)),
        ]));
    }
    Text::from(lines)
}

fn chat_text(app: &App) -> Text<'static> {
    if app.chat.messages.is_empty() {
        return welcome_text();
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    let last_idx = app.chat.messages.len() - 1;

    for (idx, msg) in app.chat.messages.iter().enumerate() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Assistant:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                if idx == last_idx && app.chat.is_awaiting_first_chunk() {
                    // Animated ellipsis: cycles through ".", "..", "..."
                    let dots = ".".repeat((app.animation_frame as usize) + 1);
                    lines.push(Line::from(Span::styled(
                        format!("Thinking{}", dots),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )));
                } else if msg.content.is_empty() {
                    lines.push(Line::default());
                }
                // Split response into lines and parse markdown
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    Text::from(lines)
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store area for mouse hit-testing and its inner size for scroll calculations
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let text = Paragraph::new(chat_text(app)).wrap(Wrap { trim: true });

    // Count rows with the same wrapping the paragraph renders with
    let rows = text.line_count(app.chat_width);
    app.chat_lines = u16::try_from(rows).unwrap_or(u16::MAX);
    if app.follow_tail {
        app.scroll_chat_to_bottom();
    }

    let fullscreen_hint = if app.chat.is_fullscreen { " [f: exit fullscreen] " } else { "" };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ")
        .title_bottom(Line::from(fullscreen_hint).right_aligned());

    let chat = text.block(chat_block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.chat.is_loading {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = if app.chat.is_loading {
        " Waiting for reply... "
    } else {
        " Ask me about Cory... (Enter to send) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Get the visible slice of the input
    let visible_text: String = app.chat.input_value
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing && !app.chat.is_loading {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_chat::{Analytics, ChatError, ChatSession, ChatTransport, ChunkStream, Message};
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct NoTransport;

    #[async_trait]
    impl ChatTransport for NoTransport {
        async fn open(&self, _message: &str) -> Result<ChunkStream, ChatError> {
            Err(ChatError::Status { status: 500 })
        }
    }

    fn app() -> App {
        App::new(ChatSession::new(Arc::new(NoTransport), Analytics::disabled()))
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("plain **bold** tail");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "bold");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_bold_is_literal() {
        let line = parse_markdown_line("half **open");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "half **open");
    }

    #[test]
    fn test_empty_chat_shows_welcome_and_examples() {
        let mut app = app();
        let screen = draw(&mut app);
        assert!(screen.contains(HEADER_TITLE));
        assert!(screen.contains("Welcome! Ask me anything"));
        assert!(screen.contains("Try asking:"));
        assert!(screen.contains("What are Cory's technical skills?"));
    }

    #[test]
    fn test_fullscreen_hides_header_but_keeps_chat() {
        let mut app = app();
        app.chat.is_fullscreen = true;
        let screen = draw(&mut app);
        assert!(!screen.contains(HEADER_TITLE));
        assert!(screen.contains("Welcome! Ask me anything"));
    }

    #[test]
    fn test_follow_tail_reaches_last_word_wrapped_line() {
        let mut app = app();
        let mut reply = "abcdefghijklmno ".repeat(20);
        reply.push_str("tailmarker");
        app.chat.messages = vec![Message::user("hi"), Message::pending_reply().with_content(&reply)];

        let mut terminal = Terminal::new(TestBackend::new(24, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        // One word per row at this width: more rows than a character count predicts
        assert!(app.chat_lines as usize > reply.chars().count() / app.chat_width as usize + 1 + 5);
        assert_eq!(app.chat_scroll, app.chat_lines - app.chat_height);

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("tailmarker"));
    }

    #[test]
    fn test_pending_reply_shows_thinking() {
        let mut app = app();
        app.chat.messages = vec![Message::user("hello"), Message::pending_reply()];
        app.chat.is_loading = true;
        let screen = draw(&mut app);
        assert!(screen.contains("You:"));
        assert!(screen.contains("Thinking."));
        assert!(screen.contains("Waiting for reply"));
    }
}
