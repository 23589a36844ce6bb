const MAX_EVIDENCE_LENGTH: usize = 500;
const MAX_ERROR_BODY_LENGTH: usize = 300;

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub fn truncate_evidence(evidence: &str) -> String {
    truncate_chars(evidence, MAX_EVIDENCE_LENGTH)
}

/// Backend error bodies can be whole HTML debug pages; keep the head only.
pub fn truncate_error_body(body: &str) -> String {
    truncate_chars(body.trim(), MAX_ERROR_BODY_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcde", 5), "abcde");
    }

    #[test]
    fn test_long_text_cut_with_ellipsis() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
    }

    #[test]
    fn test_multibyte_boundary_safe() {
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    #[test]
    fn test_evidence_limit() {
        let long = "A".repeat(600);
        let out = truncate_evidence(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.len(), 503);
    }
}
