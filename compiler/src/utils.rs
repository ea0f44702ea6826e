use crate::state::State;

/// JSON-style quoting for names shown in diagnostics.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}

/// The text up to the first line break.
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// 0-based line and column just past the last character of `text`.
pub fn end_position(text: &str) -> (usize, usize) {
    let mut state = State::new(text);
    while !state.at_end() {
        state = state.advance();
    }
    (state.line, state.col)
}
