use serde_json::{Map, Value};

use crate::{CancelReason, ExitCallback, Result, ScrollError};

/// An arbitrary caller payload delivered with an exit event.
pub type Message = Map<String, Value>;

/// Key under which the engine records why a scroll was aborted.
pub const CANCELLED_KEY: &str = "cancelled";

/// One mutable message bag per exit callback of an animation.
///
/// Senders merge into the bags while the animation is running or queued; the matching bag is
/// handed out with the exit event and then dropped with the animation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OuterMessages {
    pub complete: Message,
    pub done: Message,
    pub fail: Message,
    pub always: Message,
}

impl OuterMessages {
    pub fn get(&self, callback: ExitCallback) -> &Message {
        match callback {
            ExitCallback::Complete => &self.complete,
            ExitCallback::Done => &self.done,
            ExitCallback::Fail => &self.fail,
            ExitCallback::Always => &self.always,
        }
    }

    pub fn get_mut(&mut self, callback: ExitCallback) -> &mut Message {
        match callback {
            ExitCallback::Complete => &mut self.complete,
            ExitCallback::Done => &mut self.done,
            ExitCallback::Fail => &mut self.fail,
            ExitCallback::Always => &mut self.always,
        }
    }

    /// Merges `message` into the selected bags; colliding keys take the newer value.
    pub fn merge(&mut self, message: &Message, callbacks: &[ExitCallback]) {
        for &cb in callbacks {
            let bag = self.get_mut(cb);
            for (k, v) in message {
                bag.insert(k.clone(), v.clone());
            }
        }
    }

    pub(crate) fn take(&mut self, callback: ExitCallback) -> Message {
        core::mem::take(self.get_mut(callback))
    }
}

/// Accepts only JSON objects as messages.
pub(crate) fn expect_object(value: Value, invalid: impl FnOnce(String) -> ScrollError) -> Result<Message> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(invalid(json_kind(&other).to_owned())),
    }
}

/// Builds the message sent to an animation that is being cancelled.
///
/// The caller payload is kept, but `cancelled` always reflects the real cause.
pub(crate) fn cancellation_message(payload: Option<&Message>, reason: CancelReason) -> Message {
    let mut message = payload.cloned().unwrap_or_default();
    message.insert(CANCELLED_KEY.to_owned(), Value::from(reason.as_str()));
    message
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
