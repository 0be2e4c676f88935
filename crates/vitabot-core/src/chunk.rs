//! Re-chunking for simulated streaming: the full model reply is split into
//! fixed-size segments and each segment becomes one SSE `data` frame.

/// Splits `text` into segments of at most `max_chars` characters.
/// Char-based, never splits inside a multi-byte codepoint (replies are mostly
/// Cyrillic). Empty input yields no segments.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    assert!(max_chars > 0, "chunk size must be positive");
    let mut out = Vec::new();
    let mut current = String::new();
    let mut len = 0usize;
    for ch in text.chars() {
        current.push(ch);
        len += 1;
        if len == max_chars {
            out.push(std::mem::take(&mut current));
            len = 0;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_is_ceil_of_length() {
        let text = "a".repeat(450);
        let chunks = split_chunks(&text, 200);
        assert_eq!(chunks.len(), 3); // ceil(450 / 200)
        assert_eq!(chunks[0].chars().count(), 200);
        assert_eq!(chunks[2].chars().count(), 50);
    }

    #[test]
    fn test_concatenation_restores_input() {
        let text = "Привет! ".repeat(60);
        let chunks = split_chunks(&text, 200);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_multibyte_boundaries_are_respected() {
        let text = "я".repeat(201);
        let chunks = split_chunks(&text, 200);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 200);
        assert_eq!(chunks[1], "я");
    }

    #[test]
    fn test_short_and_empty_input() {
        assert_eq!(split_chunks("hi", 200), vec!["hi".to_string()]);
        assert!(split_chunks("", 200).is_empty());
    }
}
