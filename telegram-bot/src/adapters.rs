//! Converters from teloxide messages to the core [`Incoming`] envelope and
//! tagged [`InboundEvent`] union.

use gbot_core::{Chat, InboundEvent, Incoming, PhotoAttachment, User};
use teloxide::types::UserId;

/// Converts a transport-specific user to the core [`User`].
pub fn core_user(user: &teloxide::types::User) -> User {
    User {
        id: user.id.0 as i64,
        username: user.username.clone(),
    }
}

/// Wraps a teloxide message together with the bot's own user id (from get_me)
/// so the reply-to-bot relation can be resolved.
pub struct TelegramMessageWrapper<'a> {
    pub message: &'a teloxide::types::Message,
    pub bot_user_id: Option<UserId>,
}

impl TelegramMessageWrapper<'_> {
    /// Builds the core envelope. Returns `None` for messages without a sender
    /// (channel posts) or with an unsupported payload kind.
    pub fn to_incoming(&self) -> Option<Incoming> {
        let user = self.message.from.as_ref().map(core_user)?;
        let event = self.event()?;
        let chat = Chat {
            id: self.message.chat.id.0,
            is_private: self.message.chat.is_private(),
        };
        let reply_to_bot = self
            .message
            .reply_to_message()
            .and_then(|replied| replied.from.as_ref())
            .zip(self.bot_user_id)
            .map(|(author, me)| author.id == me)
            .unwrap_or(false);

        Some(Incoming {
            user,
            chat,
            reply_to_bot,
            event,
        })
    }

    fn event(&self) -> Option<InboundEvent> {
        let msg = self.message;

        if let Some(text) = msg.text() {
            return Some(InboundEvent::Text {
                text: text.to_string(),
            });
        }

        if let Some(photos) = msg.photo() {
            return Some(InboundEvent::Image {
                caption: msg.caption().map(str::to_string),
                photos: photos
                    .iter()
                    .map(|p| PhotoAttachment {
                        file_id: p.file.id.0.clone(),
                        width: p.width,
                        height: p.height,
                    })
                    .collect(),
            });
        }

        if let Some(doc) = msg.document() {
            return Some(InboundEvent::Document {
                caption: msg.caption().map(str::to_string),
                file_id: doc.file.id.0.clone(),
                file_name: doc.file_name.clone(),
                mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
            });
        }

        None
    }
}
