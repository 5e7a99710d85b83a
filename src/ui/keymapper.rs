//! Key decoding for terminal input
//!
//! Converts the raw byte sequences a terminal delivers in raw mode into a
//! closed set of keys, and keys into form commands. All knowledge about VT
//! escape sequences lives here.

/// A decoded key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Enter,
    Backspace,
    /// Ctrl+C
    Interrupt,
    Char(char),
    /// Several printable characters delivered in one read (paste, fast typing)
    Text(String),
    /// Anything we do not recognise, kept verbatim
    Other(Vec<u8>),
}

/// What the form should do with a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FocusPrev,
    FocusNext,
    Submit,
    Abort,
    /// Forwarded to the focused field
    Edit(Key),
}

/// Key mapper for converting input bytes to keys
pub struct KeyMapper;

impl KeyMapper {
    /// Decode one key sequence as read from the terminal
    pub fn decode(bytes: &[u8]) -> Key {
        match bytes {
            [0x03] => Key::Interrupt,
            [0x09] => Key::Tab,
            [0x0D] | [0x0A] | [0x0D, 0x0A] => Key::Enter,
            [0x7F] | [0x08] => Key::Backspace,

            // Normal mode: ESC [ <key>, application mode: ESC O <key>
            [0x1B, b'[' | b'O', key] => Self::arrow_key(*key)
                .unwrap_or_else(|| Key::Other(bytes.to_vec())),

            _ => Self::map_text(bytes).unwrap_or_else(|| Key::Other(bytes.to_vec())),
        }
    }

    /// Map a key to the command it triggers
    pub fn command(key: Key) -> Command {
        match key {
            Key::Up => Command::FocusPrev,
            Key::Down | Key::Tab => Command::FocusNext,
            Key::Enter => Command::Submit,
            Key::Interrupt => Command::Abort,
            other => Command::Edit(other),
        }
    }

    fn arrow_key(key: u8) -> Option<Key> {
        match key {
            b'A' => Some(Key::Up),
            b'B' => Some(Key::Down),
            b'C' => Some(Key::Right),
            b'D' => Some(Key::Left),
            _ => None,
        }
    }

    /// Printable UTF-8 text: one character, or a run of them
    fn map_text(bytes: &[u8]) -> Option<Key> {
        let text = std::str::from_utf8(bytes).ok()?;
        if text.is_empty() || text.chars().any(char::is_control) {
            return None;
        }
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(Key::Char(ch)),
            _ => Some(Key::Text(text.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_keys() {
        assert_eq!(KeyMapper::decode(&[0x03]), Key::Interrupt);
        assert_eq!(KeyMapper::decode(&[0x09]), Key::Tab);
        assert_eq!(KeyMapper::decode(&[0x0D]), Key::Enter);
        assert_eq!(KeyMapper::decode(&[0x7F]), Key::Backspace);
        assert_eq!(KeyMapper::decode(&[0x08]), Key::Backspace);
    }

    #[test]
    fn test_arrow_keys() {
        // Normal mode
        assert_eq!(KeyMapper::decode(b"\x1b[A"), Key::Up);
        assert_eq!(KeyMapper::decode(b"\x1b[B"), Key::Down);
        assert_eq!(KeyMapper::decode(b"\x1b[C"), Key::Right);
        assert_eq!(KeyMapper::decode(b"\x1b[D"), Key::Left);

        // Application cursor mode
        assert_eq!(KeyMapper::decode(b"\x1bOA"), Key::Up);
    }

    #[test]
    fn test_char_keys() {
        assert_eq!(KeyMapper::decode(b"a"), Key::Char('a'));
        assert_eq!(KeyMapper::decode("é".as_bytes()), Key::Char('é'));
        assert_eq!(KeyMapper::decode("界".as_bytes()), Key::Char('界'));
    }

    #[test]
    fn test_unknown_sequences_are_kept() {
        // F5
        assert_eq!(
            KeyMapper::decode(b"\x1b[15~"),
            Key::Other(b"\x1b[15~".to_vec())
        );
        assert_eq!(KeyMapper::decode(b"\x1b[Z"), Key::Other(b"\x1b[Z".to_vec()));
        assert_eq!(KeyMapper::decode(&[0x1B]), Key::Other(vec![0x1B]));
        assert_eq!(KeyMapper::decode(&[0xFF]), Key::Other(vec![0xFF]));
        // Text mixed with control bytes is not split up
        assert_eq!(KeyMapper::decode(b"ab\r"), Key::Other(b"ab\r".to_vec()));
        assert_eq!(KeyMapper::decode(b"\x1b[Aab"), Key::Other(b"\x1b[Aab".to_vec()));
    }

    #[test]
    fn test_text_chunks() {
        // Several characters in a single read
        assert_eq!(KeyMapper::decode(b"alice"), Key::Text("alice".to_string()));
        assert_eq!(KeyMapper::decode("日本".as_bytes()), Key::Text("日本".to_string()));
        assert_eq!(
            KeyMapper::command(Key::Text("ab".to_string())),
            Command::Edit(Key::Text("ab".to_string()))
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(KeyMapper::command(Key::Up), Command::FocusPrev);
        assert_eq!(KeyMapper::command(Key::Down), Command::FocusNext);
        assert_eq!(KeyMapper::command(Key::Tab), Command::FocusNext);
        assert_eq!(KeyMapper::command(Key::Enter), Command::Submit);
        assert_eq!(KeyMapper::command(Key::Interrupt), Command::Abort);
        assert_eq!(
            KeyMapper::command(Key::Char('x')),
            Command::Edit(Key::Char('x'))
        );
        assert_eq!(KeyMapper::command(Key::Left), Command::Edit(Key::Left));
    }
}
