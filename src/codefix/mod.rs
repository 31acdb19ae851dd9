//! Conservative cleanup of model-generated source text.
//!
//! Generated component code occasionally arrives with mechanical damage:
//! stray quotes after attribute expressions, unterminated template literals,
//! dangling opening quotes before a closing brace. Nothing here parses the
//! output language; the pipeline is a fixed set of textual rewrites
//! ([`sanitize`]), a counting heuristic for structural damage
//! ([`is_likely_broken`]) and a single corrective model round trip
//! ([`maybe_repair`]).

pub mod detect;
pub mod repair;
pub mod sanitize;

pub use detect::is_likely_broken;
pub use repair::{maybe_repair, ModelInvoker};
pub use sanitize::{sanitize, strip_code_fence};

/// Counts occurrences of `target` that are not preceded by a backslash
/// escape. A backslash consumes the following character, so `\\'` counts the
/// quote and `\'` does not.
pub(crate) fn count_unescaped(chars: &[char], target: char) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == target {
            count += 1;
        }
        i += 1;
    }
    count
}

/// True if the first non-whitespace character of `line` is a closing token.
/// The sanitizer additionally treats a template-literal backtick as closing;
/// the detector does not.
pub(crate) fn starts_with_closing_token(line: &str, include_backtick: bool) -> bool {
    match line.trim_start().chars().next() {
        Some('}') | Some(')') | Some(']') | Some(',') | Some(';') => true,
        Some('`') => include_backtick,
        _ => false,
    }
}

/// First non-blank line at or after `start`.
pub(crate) fn next_non_blank<'a>(lines: &'a [&'a str], start: usize) -> Option<&'a str> {
    lines[start.min(lines.len())..]
        .iter()
        .find(|l| !l.trim().is_empty())
        .copied()
}

/// Drops everything between unescaped backticks so quote counting does not
/// trip over text embedded in template literals.
pub(crate) fn strip_template_regions(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_template = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            if !in_template {
                out.push(c);
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                }
            }
            i += 2;
            continue;
        }
        if c == '`' {
            in_template = !in_template;
            i += 1;
            continue;
        }
        if !in_template {
            out.push(c);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_count_unescaped_skips_escapes() {
        assert_eq!(count_unescaped(&chars("'a'"), '\''), 2);
        assert_eq!(count_unescaped(&chars("don\\'t"), '\''), 0);
        assert_eq!(count_unescaped(&chars("a \\\\' b"), '\''), 1);
    }

    #[test]
    fn test_strip_template_regions() {
        assert_eq!(
            strip_template_regions("const a = `it's fine`; const b = 'x';"),
            "const a = ; const b = 'x';"
        );
        // Unterminated template swallows the rest of the text.
        assert_eq!(strip_template_regions("before `dangling 'quote"), "before ");
    }

    #[test]
    fn test_closing_token_detection() {
        assert!(starts_with_closing_token("  }", false));
        assert!(starts_with_closing_token("),", false));
        assert!(!starts_with_closing_token("  `template`", false));
        assert!(starts_with_closing_token("  `template`", true));
        assert!(!starts_with_closing_token("const x = 1;", false));
    }
}
