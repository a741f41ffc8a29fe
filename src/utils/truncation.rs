const MAX_OUTPUT_LENGTH: usize = 15_000;
const MAX_ERROR_LENGTH: usize = 2_000;

/// Keep the head and tail of long scanner output.
pub fn truncate_output(output: &str) -> String {
    truncate_middle(output, MAX_OUTPUT_LENGTH)
}

pub fn truncate_error(error: &str) -> String {
    if error.len() <= MAX_ERROR_LENGTH {
        error.to_string()
    } else {
        format!("{}...", &error[..floor_char_boundary(error, MAX_ERROR_LENGTH)])
    }
}

pub fn truncate_middle(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let half = max / 2;
    let head_end = floor_char_boundary(text, half);
    let tail_start = ceil_char_boundary(text, text.len() - half);
    format!(
        "{}\n\n... [truncated {} chars] ...\n\n{}",
        &text[..head_end],
        tail_start - head_end,
        &text[tail_start..]
    )
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_output_untouched() {
        assert_eq!(truncate_output("hello"), "hello");
    }

    #[test]
    fn test_long_output_keeps_head_and_tail() {
        let text = format!("{}{}", "a".repeat(10_000), "b".repeat(10_000));
        let truncated = truncate_output(&text);
        assert!(truncated.starts_with("aaa"));
        assert!(truncated.ends_with("bbb"));
        assert!(truncated.contains("[truncated 5000 chars]"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(5);
        let truncated = truncate_middle(&text, 5);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_truncate_error() {
        let long = "x".repeat(3_000);
        let truncated = truncate_error(&long);
        assert_eq!(truncated.len(), 2_003);
        assert!(truncated.ends_with("..."));
    }
}
