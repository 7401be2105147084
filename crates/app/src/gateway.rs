//! Console gateway - prints outbound chat traffic to a writer

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use mafia_core::{ChatGateway, ChatId, GatewayError, Markup, MessageRef, SendOptions};

pub struct ConsoleGateway {
    out: Mutex<Box<dyn Write + Send>>,
    /// Last message id issued per chat
    issued: Mutex<HashMap<ChatId, i64>>,
}

impl ConsoleGateway {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            issued: Mutex::new(HashMap::new()),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn write(&self, header: &str, text: &str, markup: Option<&Markup>) -> Result<(), GatewayError> {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Console writer poisoned, recovering");
            poisoned.into_inner()
        });
        let mut block = format!("{}\n", header);
        for line in text.lines() {
            block.push_str("  ");
            block.push_str(line);
            block.push('\n');
        }
        if let Some(markup) = markup {
            for row in &markup.rows {
                let buttons: Vec<String> = row
                    .iter()
                    .map(|b| format!("[{}] #cb {}", b.label, b.callback))
                    .collect();
                block.push_str(&format!("  {}\n", buttons.join("  ")));
            }
        }
        out.write_all(block.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| GatewayError::Other(e.to_string()))
    }
}

impl ChatGateway for ConsoleGateway {
    fn send_private(
        &self,
        chat_id: ChatId,
        text: &str,
        options: &SendOptions,
    ) -> Result<MessageRef, GatewayError> {
        let message_id = {
            let mut issued = self.issued.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let next = issued.entry(chat_id).or_insert(0);
            *next += 1;
            *next
        };
        self.write(
            &format!("-> chat {} #{}", chat_id, message_id),
            text,
            options.markup.as_ref(),
        )?;
        Ok(MessageRef { chat_id, message_id })
    }

    fn edit_message<'a>(
        &self,
        message: &MessageRef,
        text: &str,
        markup: Option<&'a Markup>,
    ) -> Result<(), GatewayError> {
        let known = self
            .issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&message.chat_id)
            .is_some_and(|last| (1..=*last).contains(&message.message_id));
        if !known {
            return Err(GatewayError::MessageGone(*message));
        }
        self.write(
            &format!("~> chat {} #{} (edited)", message.chat_id, message.message_id),
            text,
            markup,
        )
    }
}
