pub mod keycode;

/// "s" when `n` calls for a plural
pub fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
