//! Inbound chat commands

use fuelbot_util::{ChannelId, UserId};
use serde::{Deserialize, Serialize};

/// Literal message text that requests a fuel status summary.
///
/// Matching is exact and case-sensitive; surrounding whitespace is not
/// tolerated.
pub const FUEL_STATUS_TRIGGER: &str = "!fuel";

/// A chat message observed by a command listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Transport-level message id, used by listeners to page forward
    pub message_id: String,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub content: String,
}

/// Commands the bot reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Post a status summary of every structure to `reply_to`
    FuelStatus { reply_to: ChannelId },
}

/// Turn an inbound message into a command.
///
/// Messages written by the bot itself are ignored, as is anything that is not
/// exactly [`FUEL_STATUS_TRIGGER`].
pub fn parse_command(message: &InboundMessage, self_id: &UserId) -> Option<Command> {
    if &message.author_id == self_id {
        return None;
    }

    if message.content == FUEL_STATUS_TRIGGER {
        return Some(Command::FuelStatus {
            reply_to: message.channel_id.clone(),
        });
    }

    None
}
