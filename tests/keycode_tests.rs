use global_hotkey::hotkey::Code;
use quizblink::utils::keycode::{
    code_to_key_name, key_name_to_code, key_to_digit, normalize_key_name, numpad_digit_codes,
};

#[test]
fn test_primary_digits() {
    for (i, name) in ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]
        .iter()
        .enumerate()
    {
        let expected = char::from_digit(i as u32, 10);
        assert_eq!(key_to_digit(name), expected, "Digit key {}", name);
    }
}

#[test]
fn test_azerty_glyphs() {
    assert_eq!(key_to_digit("&"), Some('1'));
    assert_eq!(key_to_digit("é"), Some('2'));
    assert_eq!(key_to_digit("\""), Some('3'));
    assert_eq!(key_to_digit("'"), Some('4'));
    assert_eq!(key_to_digit("("), Some('5'));
    assert_eq!(key_to_digit(")"), Some('5'));
    assert_eq!(key_to_digit("-"), Some('6'));
    assert_eq!(key_to_digit("è"), Some('7'));
    assert_eq!(key_to_digit("_"), Some('8'));
    assert_eq!(key_to_digit("ç"), Some('9'));
    assert_eq!(key_to_digit("à"), Some('0'));
}

#[test]
fn test_azerty_key_names() {
    assert_eq!(key_to_digit("ampersand"), Some('1'));
    assert_eq!(key_to_digit("eacute"), Some('2'));
    assert_eq!(key_to_digit("quotedbl"), Some('3'));
    assert_eq!(key_to_digit("apostrophe"), Some('4'));
    assert_eq!(key_to_digit("parenleft"), Some('5'));
    assert_eq!(key_to_digit("parenright"), Some('5'));
    assert_eq!(key_to_digit("minus"), Some('6'));
    assert_eq!(key_to_digit("egrave"), Some('7'));
    assert_eq!(key_to_digit("underscore"), Some('8'));
    assert_eq!(key_to_digit("ccedilla"), Some('9'));
    assert_eq!(key_to_digit("agrave"), Some('0'));
}

#[test]
fn test_key_names_ignore_case() {
    assert_eq!(key_to_digit("EACUTE"), Some('2'));
    assert_eq!(key_to_digit("Ampersand"), Some('1'));
    assert_eq!(key_to_digit("É"), Some('2'));
}

#[test]
fn test_non_digit_keys() {
    assert_eq!(key_to_digit("a"), None);
    assert_eq!(key_to_digit("enter"), None);
    assert_eq!(key_to_digit("12"), None);
    assert_eq!(key_to_digit(""), None);
    assert_eq!(key_to_digit("space"), None);
}

#[test]
fn test_normalize_aliases() {
    assert_eq!(normalize_key_name("Escape"), "esc");
    assert_eq!(normalize_key_name("RETURN"), "enter");
    assert_eq!(normalize_key_name(" Right "), "right");
    assert_eq!(normalize_key_name("ArrowRight"), "right");
    assert_eq!(normalize_key_name("droite"), "right");
    assert_eq!(normalize_key_name("gauche"), "left");
    assert_eq!(normalize_key_name("F8"), "f8");
}

#[test]
fn test_key_name_to_code() {
    assert_eq!(key_name_to_code("right"), Some(Code::ArrowRight));
    assert_eq!(key_name_to_code("Escape"), Some(Code::Escape));
    assert_eq!(key_name_to_code("return"), Some(Code::Enter));
    assert_eq!(key_name_to_code("backspace"), Some(Code::Backspace));
    assert_eq!(key_name_to_code("7"), Some(Code::Digit7));
    assert_eq!(key_name_to_code("F12"), Some(Code::F12));
    assert_eq!(key_name_to_code("page down"), Some(Code::PageDown));
    assert_eq!(key_name_to_code("hyper"), None);
}

#[test]
fn test_code_names_roundtrip_for_control_keys() {
    for name in ["enter", "esc", "backspace", "space", "tab", "left", "right", "f1", "home"] {
        let code = key_name_to_code(name).unwrap();
        assert_eq!(code_to_key_name(code), Some(name), "Round trip for {}", name);
    }
}

#[test]
fn test_numpad_codes_are_digits() {
    let names: Vec<&str> = numpad_digit_codes()
        .into_iter()
        .filter_map(code_to_key_name)
        .collect();
    assert_eq!(names, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    assert_eq!(code_to_key_name(Code::NumpadEnter), Some("enter"));
    assert_eq!(code_to_key_name(Code::KeyQ), None);
}
