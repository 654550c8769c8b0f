//! Room identifiers

use std::fmt;

use serde::Serialize;

use crate::error::{RelayError, RelayResult};

/// Prefix prepended to a room name to form its group key
pub const GROUP_PREFIX: &str = "chat_";

/// Longest accepted room name. Keeps the group key under 100 characters.
pub const MAX_ROOM_NAME_LEN: usize = 90;

/// Name of a chat room, restricted to ASCII letters, digits, `-`, `.` and `_`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Validate a room name taken from the request path
    pub fn parse(name: impl Into<String>) -> RelayResult<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.len() <= MAX_ROOM_NAME_LEN
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_'));

        if valid {
            Ok(Self(name))
        } else {
            Err(RelayError::InvalidRoomName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Group key used for this room, e.g. `chat_lobby`
    pub fn group_key(&self) -> String {
        format!("{}{}", GROUP_PREFIX, self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
