use crate::langflow::LangflowClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// One turn of the conversation. History is append-only: turns are
/// pushed in order and never mutated or removed for the life of the
/// session.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input line
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Conversation
    pub messages: Vec<ChatMessage>,
    pub loading: bool,
    pub reply_task: Option<tokio::task::JoinHandle<anyhow::Result<String>>>,

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of chat area, set during render
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: LangflowClient,
}

impl App {
    pub fn new(client: LangflowClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            input: String::new(),
            cursor: 0,

            messages: Vec::new(),
            loading: false,
            reply_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            client,
        }
    }

    /// A message can be sent when there is non-blank text and no request
    /// in flight.
    pub fn ready_to_send(&self) -> bool {
        !self.input.trim().is_empty() && self.reply_task.is_none()
    }

    pub fn push_user(&mut self, content: String) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content,
        });
    }

    pub fn push_bot(&mut self, content: String) {
        self.messages.push(ChatMessage {
            role: ChatRole::Bot,
            content,
        });
    }

    /// Collect a finished reply task, if any. The reply and the error
    /// case are both displayed as the bot's turn.
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .map(|t| t.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.reply_task.take() {
            let content = match task.await {
                Ok(Ok(reply)) => reply,
                Ok(Err(e)) => format!("Error: {}", e),
                Err(e) => format!("Error: request task failed: {}", e),
            };
            self.push_bot(content);
            self.loading = false;
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(self.chat_height / 2);
    }

    /// Scroll chat to bottom so the newest turn (or "Thinking...") is
    /// visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        // Saturating: a long session can exceed u16 line counts
        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "Bot:")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 {
                    1
                } else {
                    ((char_count / wrap_width) + 1) as u16
                };
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.loading {
            total_lines = total_lines.saturating_add(2); // "Bot:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}
