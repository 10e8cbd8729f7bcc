use global_hotkey::hotkey::Code;

/// Alternate glyphs for the digit row on a French AZERTY keyboard, both as
/// typed characters and as the key names X11 reports for them.
const ALTERNATE_DIGITS: &[(&str, char)] = &[
    ("&", '1'),
    ("ampersand", '1'),
    ("é", '2'),
    ("eacute", '2'),
    ("\"", '3'),
    ("quotedbl", '3'),
    ("'", '4'),
    ("apostrophe", '4'),
    ("(", '5'),
    ("parenleft", '5'),
    (")", '5'),
    ("parenright", '5'),
    ("-", '6'),
    ("minus", '6'),
    ("è", '7'),
    ("egrave", '7'),
    ("_", '8'),
    ("underscore", '8'),
    ("ç", '9'),
    ("ccedilla", '9'),
    ("à", '0'),
    ("agrave", '0'),
];

/// Canonical form of a key name: trimmed, lowercase, common aliases folded
pub fn normalize_key_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "escape" => "esc".to_string(),
        "return" => "enter".to_string(),
        "gauche" => "left".to_string(),
        "droite" => "right".to_string(),
        "arrowleft" => "left".to_string(),
        "arrowright" => "right".to_string(),
        "arrowup" => "up".to_string(),
        "arrowdown" => "down".to_string(),
        _ => lower,
    }
}

/// Convert a key name to the decimal digit it stands for.
///
/// Accepts `0`-`9` and the AZERTY alternates (`&é"'(-è_çà`), so digits typed
/// with or without Shift on either layout land in the same buffer.
pub fn key_to_digit(name: &str) -> Option<char> {
    let name = name.trim();
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_digit() {
            return Some(ch);
        }
    }

    let lower = name.to_lowercase();
    ALTERNATE_DIGITS
        .iter()
        .find(|(glyph, _)| *glyph == lower)
        .map(|(_, digit)| *digit)
}

/// Key name for a global_hotkey Code, matching the names accepted in config
/// Returns None for keys quizblink never listens to
pub fn code_to_key_name(code: Code) -> Option<&'static str> {
    match code {
        Code::Digit0 | Code::Numpad0 => Some("0"),
        Code::Digit1 | Code::Numpad1 => Some("1"),
        Code::Digit2 | Code::Numpad2 => Some("2"),
        Code::Digit3 | Code::Numpad3 => Some("3"),
        Code::Digit4 | Code::Numpad4 => Some("4"),
        Code::Digit5 | Code::Numpad5 => Some("5"),
        Code::Digit6 | Code::Numpad6 => Some("6"),
        Code::Digit7 | Code::Numpad7 => Some("7"),
        Code::Digit8 | Code::Numpad8 => Some("8"),
        Code::Digit9 | Code::Numpad9 => Some("9"),

        Code::Enter | Code::NumpadEnter => Some("enter"),
        Code::Escape => Some("esc"),
        Code::Backspace => Some("backspace"),
        Code::Space => Some("space"),
        Code::Tab => Some("tab"),

        Code::ArrowLeft => Some("left"),
        Code::ArrowRight => Some("right"),
        Code::ArrowUp => Some("up"),
        Code::ArrowDown => Some("down"),

        Code::F1 => Some("f1"),
        Code::F2 => Some("f2"),
        Code::F3 => Some("f3"),
        Code::F4 => Some("f4"),
        Code::F5 => Some("f5"),
        Code::F6 => Some("f6"),
        Code::F7 => Some("f7"),
        Code::F8 => Some("f8"),
        Code::F9 => Some("f9"),
        Code::F10 => Some("f10"),
        Code::F11 => Some("f11"),
        Code::F12 => Some("f12"),

        Code::Insert => Some("insert"),
        Code::Delete => Some("delete"),
        Code::Home => Some("home"),
        Code::End => Some("end"),
        Code::PageUp => Some("page up"),
        Code::PageDown => Some("page down"),

        _ => None,
    }
}

/// Physical key for a configured key name
/// Digits resolve to the top-row keys, which AZERTY also reports as digits
pub fn key_name_to_code(name: &str) -> Option<Code> {
    let name = normalize_key_name(name);
    let code = match name.as_str() {
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,

        "enter" => Code::Enter,
        "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "space" => Code::Space,
        "tab" => Code::Tab,

        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,

        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,

        "insert" => Code::Insert,
        "delete" => Code::Delete,
        "home" => Code::Home,
        "end" => Code::End,
        "page up" => Code::PageUp,
        "page down" => Code::PageDown,

        _ => return None,
    };
    Some(code)
}

/// Numpad keys that should also feed digits while armed
pub fn numpad_digit_codes() -> [Code; 10] {
    [
        Code::Numpad0,
        Code::Numpad1,
        Code::Numpad2,
        Code::Numpad3,
        Code::Numpad4,
        Code::Numpad5,
        Code::Numpad6,
        Code::Numpad7,
        Code::Numpad8,
        Code::Numpad9,
    ]
}
