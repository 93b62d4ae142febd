use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_reply().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the input line
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.cursor = app.input.chars().count();
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit_message(app);
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Append the user's turn and fire the request. Enter is a no-op while
/// a reply is pending, so only one request is ever in flight.
fn submit_message(app: &mut App) {
    if !app.ready_to_send() {
        return;
    }

    let message = app.input.clone();
    app.push_user(message.clone());

    app.input.clear();
    app.cursor = 0;
    app.loading = true;

    // Scroll to bottom so "Thinking..." is visible
    app.scroll_chat_to_bottom();

    let client = app.client.clone();
    app.reply_task = Some(tokio::spawn(async move {
        client.run_flow(&message).await
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::langflow::LangflowClient;

    fn test_app() -> App {
        let settings = Settings {
            base_api_url: "https://api.example.com".to_string(),
            langflow_id: "lf".to_string(),
            flow_id: "flow".to_string(),
            application_token: "token".to_string(),
        };
        App::new(LangflowClient::new(&settings))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut app = test_app();
        for c in "héllo".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        handle_key(&mut app, press(KeyCode::Home));
        handle_key(&mut app, press(KeyCode::Char('>')));

        assert_eq!(app.input, ">héllo");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_backspace_is_utf8_safe() {
        let mut app = test_app();
        for c in "día".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        handle_key(&mut app, press(KeyCode::Left));
        handle_key(&mut app, press(KeyCode::Backspace));

        assert_eq!(app.input, "da");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_enter_with_empty_input_does_nothing() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Enter));

        assert!(app.messages.is_empty());
        assert!(!app.loading);
        assert!(app.reply_task.is_none());
    }

    #[test]
    fn test_enter_with_blank_input_does_nothing() {
        let mut app = test_app();
        for c in "   ".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        handle_key(&mut app, press(KeyCode::Enter));

        assert!(app.messages.is_empty());
        assert!(app.reply_task.is_none());
    }

    #[tokio::test]
    async fn test_enter_ignored_while_reply_pending() {
        let mut app = test_app();
        app.reply_task = Some(tokio::spawn(async {
            // Never completes during this test
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(String::new())
        }));

        app.input.push_str("second question");
        app.cursor = app.input.chars().count();
        handle_key(&mut app, press(KeyCode::Enter));

        // Input kept, no user turn appended
        assert_eq!(app.input, "second question");
        assert!(app.messages.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits_in_editing_mode() {
        let mut app = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_esc_leaves_editing_mode() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
