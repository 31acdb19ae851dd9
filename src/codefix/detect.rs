use super::{count_unescaped, next_non_blank, starts_with_closing_token, strip_template_regions};

/// Heuristic verdict on whether generated source text is structurally broken.
/// Counting-based, not grammar-based, so false positives and negatives are
/// possible; callers treat the result as a best-effort signal only.
///
/// Any of the following returns true:
/// - odd number of unescaped backticks (unterminated template literal)
/// - odd number of unescaped single or double quotes outside template
///   literals
/// - a line ending in an unmatched quote right before a closing-token line
/// - mismatched counts for any of `{}`, `()`, `[]`
pub fn is_likely_broken(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();

    if count_unescaped(&chars, '`') % 2 == 1 {
        log::debug!("detector: odd backtick count");
        return true;
    }

    let outside = strip_template_regions(text);
    let outside_chars: Vec<char> = outside.chars().collect();
    if count_unescaped(&outside_chars, '\'') % 2 == 1 {
        log::debug!("detector: odd single-quote count");
        return true;
    }
    if count_unescaped(&outside_chars, '"') % 2 == 1 {
        log::debug!("detector: odd double-quote count");
        return true;
    }

    if has_dangling_line_quote(text) {
        log::debug!("detector: dangling trailing quote before closing token");
        return true;
    }

    for (open, close) in [('{', '}'), ('(', ')'), ('[', ']')] {
        let opens = chars.iter().filter(|&&c| c == open).count();
        let closes = chars.iter().filter(|&&c| c == close).count();
        if opens != closes {
            log::debug!("detector: unbalanced {}{} ({} vs {})", open, close, opens, closes);
            return true;
        }
    }

    false
}

/// A line whose last character is a quote unpaired within that line, where
/// the next non-blank line begins with `}`, `)`, `]`, `,` or `;`. Signals a
/// stray opening quote left dangling at a line boundary.
fn has_dangling_line_quote(text: &str) -> bool {
    let lines: Vec<&str> = text.split('\n').collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        let last = match trimmed.chars().last() {
            Some(c @ ('\'' | '"')) => c,
            _ => continue,
        };
        let chars: Vec<char> = trimmed.chars().collect();
        if count_unescaped(&chars, last) % 2 == 0 {
            continue;
        }
        if let Some(next) = next_non_blank(&lines, idx + 1) {
            if starts_with_closing_token(next, false) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_template_literal() {
        assert!(is_likely_broken("const s = `hello"));
    }

    #[test]
    fn test_balanced_source_is_clean() {
        let source = r#"function Badge({ label }) {
  const cls = `rounded px-2 ${label === 'new' ? 'bg-green-100' : 'bg-gray-100'}`;
  return <span className={cls}>{label}</span>;
}
"#;
        assert!(!is_likely_broken(source));
    }

    #[test]
    fn test_odd_quote_count() {
        assert!(is_likely_broken("const a = 'unterminated;"));
        assert!(is_likely_broken("const a = \"unterminated;"));
    }

    #[test]
    fn test_quotes_inside_templates_ignored() {
        assert!(!is_likely_broken("const msg = `it's ok`;"));
    }

    #[test]
    fn test_escaped_quotes_ignored() {
        assert!(!is_likely_broken("const a = 'don\\'t';"));
    }

    #[test]
    fn test_brace_imbalance_detected_regardless_of_quotes() {
        // Three opens, two closes; quotes fully paired.
        assert!(is_likely_broken("{ { { 'a' } }"));
    }

    #[test]
    fn test_dangling_quote_before_closing_token() {
        assert!(is_likely_broken("({\n  title: 'draft'['\n})"));
        let dangling = "({\n  label: 'x',\n  title: '}'\n})";
        // Paired quote at end of line is not dangling.
        assert!(!is_likely_broken(dangling));
    }

    #[test]
    fn test_empty_text_is_clean() {
        assert!(!is_likely_broken(""));
    }
}
