//! Line normalization applied before any grammar runs.

/// Split receipt text into lines, dropping carriage returns, trailing
/// whitespace and blank lines. Leading indentation is kept.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| line.trim_end())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_blank_lines_and_carriage_returns() {
        let text = "\r\nBarbora\r\n\r\n2023-04-16\r\n   \r\n  0,65 X 2 vnt.   1,30 A  \r\n";
        assert_eq!(
            normalize_lines(text),
            vec!["Barbora", "2023-04-16", "  0,65 X 2 vnt.   1,30 A"]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let text = "a\r\n\r\nb  \n c";
        let once = normalize_lines(text).join("\n");
        assert_eq!(normalize_lines(&once), normalize_lines(text));
    }
}
