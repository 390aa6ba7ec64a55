//! Reply splitting.
//!
//! Messaging channels cap the length of a single message. A reply longer
//! than the cap is cut into consecutive chunks that concatenate back to the
//! original text.

/// Splits `text` into chunks of at most `max_length` characters.
///
/// Lengths count Unicode scalar values, so a chunk never ends inside a
/// multi-byte character. Empty text yields no chunks. A `max_length` of zero
/// is treated as one.
#[must_use]
pub fn split(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_length {
            chunks.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(text[start..].to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(text: &str, max_length: usize) {
        let chunks = split(text, max_length);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= max_length));
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(split("hi", 5000), vec!["hi".to_string()]);
    }

    #[test]
    fn text_of_exact_length_is_single_chunk() {
        assert_eq!(split("abcde", 5), vec!["abcde".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split("", 5000).is_empty());
    }

    #[test]
    fn long_reply_splits_into_full_chunks_and_remainder() {
        let text = "x".repeat(12_000);
        let chunks = split(&text, 5000);

        let lengths: Vec<usize> = chunks.iter().map(String::len).collect();
        assert_eq!(lengths, vec![5000, 5000, 2000]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn multibyte_characters_are_never_cut() {
        let text = "こんにちは世界🌏".repeat(7);
        for max_length in 1..=10 {
            assert_round_trip(&text, max_length);
        }
        assert_eq!(split("日本語", 2), vec!["日本".to_string(), "語".to_string()]);
    }

    #[test]
    fn round_trip_for_assorted_inputs() {
        let inputs = [
            "a",
            "hello world",
            "line one\nline two\n\nline three",
            "mixed ascii and ünïcödé",
        ];
        for text in inputs {
            for max_length in [1, 2, 3, 7, 100] {
                assert_round_trip(text, max_length);
            }
        }
    }

    #[test]
    fn zero_length_is_treated_as_one() {
        assert_eq!(
            split("abc", 0),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
