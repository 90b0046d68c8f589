// Helpers for the code-editor chrome: line-number gutter and cursor status.

/// Number of lines shown in the gutter. An empty buffer still has one line.
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// Gutter contents: `1\n2\n...` up to the buffer's line count.
pub fn gutter_text(text: &str) -> String {
    (1..=line_count(text))
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 1-based line and column of a cursor given as a char index.
pub fn cursor_line_col(text: &str, char_index: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for ch in text.chars().take(char_index) {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

pub fn cursor_status(text: &str, char_index: usize) -> String {
    let (line, col) = cursor_line_col(text, char_index);
    format!("Ln {line}, Col {col}   Spaces: 2   UTF-8   LF")
}
