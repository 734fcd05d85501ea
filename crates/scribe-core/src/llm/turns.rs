//! Conversation flattening shared by every adapter.
//!
//! History is rendered oldest first as alternating user/assistant turns,
//! followed by the current user turn. Images stay attached to their user turn
//! only when the model accepts images; otherwise they are dropped here so no
//! adapter has to remember to do it.

use scribe_types::image::ImageData;
use scribe_types::llm::{InvocationRequest, MessageRole};

/// One turn of the flattened conversation, borrowing from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn<'a> {
    pub role: MessageRole,
    pub text: &'a str,
    /// Always empty for assistant turns and for text-only models.
    pub images: &'a [ImageData],
}

impl Turn<'_> {
    /// Whether this turn must be rendered as a multi-part message.
    pub fn is_multimodal(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Flatten `request.history` plus the current prompt into ordered turns.
///
/// The system prompt is not included: its placement is dialect specific.
pub fn conversation_turns(request: &InvocationRequest, accepts_images: bool) -> Vec<Turn<'_>> {
    let mut turns = Vec::with_capacity(request.history.len() * 2 + 1);
    for round in &request.history {
        turns.push(Turn {
            role: MessageRole::User,
            text: &round.user_text,
            images: shown(&round.images, accepts_images),
        });
        turns.push(Turn {
            role: MessageRole::Assistant,
            text: &round.assistant_text,
            images: &[],
        });
    }

    turns.push(Turn {
        role: MessageRole::User,
        text: &request.text,
        images: shown(&request.images, accepts_images),
    });
    turns
}

fn shown(images: &[ImageData], accepts_images: bool) -> &[ImageData] {
    if accepts_images { images } else { &[] }
}
