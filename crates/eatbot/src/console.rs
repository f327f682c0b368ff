//! Line-oriented console transport
//!
//! Input lines look like `<user_id> <input>` where input is `cb:<token>`,
//! `/command` or free text. The user id may be omitted. A literal `\n` in
//! free text stands for a line break.

use std::collections::HashMap;

use async_trait::async_trait;
use chat_core::{RenderSpec, UserId};
use chat_router::{InboundEvent, RenderError, Renderer, Router};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, MutexGuard};

/// Prints screens as text followed by their buttons and tokens.
#[derive(Debug)]
pub struct ConsoleRenderer<W> {
    out: Mutex<W>,
    last: Mutex<HashMap<UserId, RenderSpec>>,
}

impl<W> ConsoleRenderer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            last: Mutex::new(HashMap::new()),
        }
    }

    pub async fn writer(&self) -> MutexGuard<'_, W> {
        self.out.lock().await
    }
}

/// Text form of one screen.
pub fn format_screen(user: UserId, screen: &RenderSpec) -> String {
    let mut out = format!("── user {user} ──\n{}\n", screen.text);
    for row in &screen.keyboard.rows {
        let row = row
            .iter()
            .map(|button| format!("[{}] cb:{}", button.label, button.token))
            .collect::<Vec<_>>()
            .join("   ");
        out.push_str(&row);
        out.push('\n');
    }
    out
}

#[async_trait]
impl<W> Renderer for ConsoleRenderer<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn render(&self, user: UserId, screen: &RenderSpec) -> Result<(), RenderError> {
        let mut last = self.last.lock().await;
        if last.get(&user) == Some(screen) {
            return Err(RenderError::Unchanged);
        }

        // Only a screen that reached the output counts as shown.
        let text = format_screen(user, screen);
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes())
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        last.insert(user, screen.clone());
        Ok(())
    }
}

/// Split a line into user and event. Empty lines yield `None`.
pub fn parse_line(line: &str, default_user: UserId) -> Option<(UserId, InboundEvent)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (user, input) = match line.split_once(char::is_whitespace) {
        Some((first, rest)) => match first.parse::<i64>() {
            Ok(id) => (UserId(id), rest.trim()),
            Err(_) => (default_user, line),
        },
        None => match line.parse::<i64>() {
            Ok(_) => return None,
            Err(_) => (default_user, line),
        },
    };

    if input.is_empty() {
        return None;
    }
    Some((user, InboundEvent::parse(&input.replace("\\n", "\n"))))
}

/// Feed every input line to the router until EOF or `quit`.
pub async fn run<R>(router: &Router, input: R, default_user: UserId) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        let Some((user, event)) = parse_line(&line, default_user) else {
            continue;
        };
        router.handle(user, event).await;
        handled += 1;
    }

    tracing::info!(events = handled, "console input finished");
    Ok(handled)
}
