use super::{count_unescaped, next_non_blank, starts_with_closing_token};

/// Applies the full ordered rule set to model output. Pure and total: every
/// rule either rewrites a clearly erroneous construct or leaves the text
/// alone, so already-clean input passes through unchanged and re-running the
/// pass is a no-op.
pub fn sanitize(text: &str) -> String {
    let mut out = strip_quote_after_brace(text);
    out = strip_quote_after_handler(&out);
    out = strip_trailing_lone_backtick(&out);
    out = drop_quote_only_lines(&out);
    out = close_dangling_ternary_quote(&out);
    out = close_dangling_line_quotes(&out);
    out = strip_control_chars(&out);
    out
}

/// Removes a markdown code fence wrapping the whole payload. Models are told
/// not to fence their output but occasionally do anyway. Not part of the
/// sanitizer rule set; runs once on the raw completion.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return text.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return text.to_string();
    }
    // Opening fence may carry a language tag; drop the whole line.
    lines.remove(0);
    if lines.last().map(|l| l.trim() == "```").unwrap_or(false) {
        lines.pop();
    }
    lines.join("\n")
}

/// Rule 1: a stray quote right after a closing brace, directly before a line
/// break or `>`. Only fires when that quote character is unpaired on the
/// line, so valid constructs like `const s = '}'` are untouched.
fn strip_quote_after_brace(text: &str) -> String {
    map_lines(text, |line, _, _| {
        let mut line = line.to_string();
        for quote in ['\'', '"'] {
            let chars: Vec<char> = line.chars().collect();
            if count_unescaped(&chars, quote) % 2 == 0 {
                continue;
            }
            for i in 0..chars.len() {
                if chars[i] == '}'
                    && chars.get(i + 1) == Some(&quote)
                    && matches!(chars.get(i + 2), None | Some(&'>'))
                {
                    let mut rebuilt: String = chars[..i + 1].iter().collect();
                    rebuilt.extend(&chars[i + 2..]);
                    line = rebuilt;
                    break;
                }
            }
        }
        line
    })
}

/// Rule 2: a trailing stray quote after an expression-attribute pattern like
/// `onClick={...}"`, where the quote is followed by whitespace or `/`.
fn strip_quote_after_handler(text: &str) -> String {
    map_lines(text, |line, _, _| {
        if !line.contains("={") {
            return line.to_string();
        }
        let mut line = line.to_string();
        for quote in ['\'', '"'] {
            let chars: Vec<char> = line.chars().collect();
            if count_unescaped(&chars, quote) % 2 == 0 {
                continue;
            }
            for i in 0..chars.len() {
                if chars[i] == '}'
                    && chars.get(i + 1) == Some(&quote)
                    && matches!(chars.get(i + 2), Some(&' ') | Some(&'\t') | Some(&'/'))
                {
                    let mut rebuilt: String = chars[..i + 1].iter().collect();
                    rebuilt.extend(&chars[i + 2..]);
                    line = rebuilt;
                    break;
                }
            }
        }
        line
    })
}

/// Rule 3: a lone backtick at the end of a line, unpaired within that line.
fn strip_trailing_lone_backtick(text: &str) -> String {
    map_lines(text, |line, _, _| {
        let trimmed = line.trim_end();
        if trimmed.ends_with('`') && trimmed.chars().filter(|&c| c == '`').count() % 2 == 1 {
            trimmed[..trimmed.len() - 1].to_string()
        } else {
            line.to_string()
        }
    })
}

/// Rule 4: lines consisting solely of a single quote character.
fn drop_quote_only_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let kept: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed != "'" && trimmed != "\""
        })
        .copied()
        .collect();
    kept.join("\n")
}

/// Rule 5: a ternary arm left as a lone opening quote (`... ? 'on' : '`)
/// right before a closing-token line becomes an explicit empty string.
fn close_dangling_ternary_quote(text: &str) -> String {
    map_lines(text, |line, lines, idx| {
        let trimmed = line.trim_end();
        let dangling = trimmed.ends_with(": '") || trimmed.ends_with(": \"");
        if dangling && trimmed.contains('?') {
            if let Some(next) = next_non_blank(lines, idx + 1) {
                if starts_with_closing_token(next, true) {
                    let quote = trimmed.chars().last().unwrap_or('\'');
                    return format!("{}{}", trimmed, quote);
                }
            }
        }
        line.to_string()
    })
}

/// Rule 6: general line-boundary pass. A line ending in an unmatched quote,
/// followed (blank lines allowed) by a closing-token line, gets the quote
/// doubled into an empty-string literal.
fn close_dangling_line_quotes(text: &str) -> String {
    map_lines(text, |line, lines, idx| {
        let trimmed = line.trim_end();
        let last = match trimmed.chars().last() {
            Some(c @ ('\'' | '"')) => c,
            _ => return line.to_string(),
        };
        let chars: Vec<char> = trimmed.chars().collect();
        if count_unescaped(&chars, last) % 2 == 0 {
            return line.to_string();
        }
        match next_non_blank(lines, idx + 1) {
            Some(next) if starts_with_closing_token(next, true) => {
                format!("{}{}", trimmed, last)
            }
            _ => line.to_string(),
        }
    })
}

/// Rule 7: strip non-printable control characters that crash downstream
/// parsers; tab, newline and carriage return survive.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\r' || c == '\t')
        .collect()
}

fn map_lines<F>(text: &str, f: F) -> String
where
    F: Fn(&str, &[&str], usize) -> String,
{
    let lines: Vec<&str> = text.split('\n').collect();
    let mapped: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| f(line, &lines, idx))
        .collect();
    mapped.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codefix::is_likely_broken;

    const VALID_COMPONENT: &str = r#"import React, { useState } from 'react';

export default function LoginForm() {
  const [email, setEmail] = useState('');
  const greeting = `Welcome back`;

  return (
    <form className="space-y-4 p-6">
      <h1 className="text-xl font-bold">{greeting}</h1>
      <input
        type="email"
        value={email}
        onChange={(e) => setEmail(e.target.value)}
        placeholder="you@example.com"
      />
      <button type="submit" onClick={() => console.log('}')}>
        Sign in
      </button>
    </form>
  );
}
"#;

    #[test]
    fn test_valid_input_is_untouched() {
        assert_eq!(sanitize(VALID_COMPONENT), VALID_COMPONENT);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            VALID_COMPONENT,
            "const x = {}'\n<div>",
            "isOpen ? 'yes' : '\n}",
            "  '\nconst a = 1;",
            "const s = `oops`",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_stray_quote_after_brace_removed() {
        assert_eq!(
            sanitize("<div style={styles}'\n</div>"),
            "<div style={styles}\n</div>"
        );
        assert_eq!(sanitize("<div style={styles}\">text"), "<div style={styles}>text");
    }

    #[test]
    fn test_stray_quote_after_handler_removed() {
        assert_eq!(
            sanitize("<button onClick={() => save()}' />"),
            "<button onClick={() => save()} />"
        );
    }

    #[test]
    fn test_paired_quote_after_brace_survives() {
        let valid = "const s = '}'";
        assert_eq!(sanitize(valid), valid);
    }

    #[test]
    fn test_trailing_lone_backtick_removed() {
        assert_eq!(sanitize("const cls = cn(base)`"), "const cls = cn(base)");
        // Paired backticks on the line are a real template literal.
        let valid = "const msg = `hello`";
        assert_eq!(sanitize(valid), valid);
    }

    #[test]
    fn test_quote_only_lines_dropped() {
        assert_eq!(sanitize("a\n  '\nb"), "a\nb");
        assert_eq!(sanitize("a\n\"\nb"), "a\nb");
    }

    #[test]
    fn test_ternary_dangling_quote_becomes_empty_string() {
        let broken = "const cls = {\n  state: isActive ? 'on' : '\n}";
        let fixed = sanitize(broken);
        assert_eq!(fixed, "const cls = {\n  state: isActive ? 'on' : ''\n}");
        assert!(!is_likely_broken(&fixed));
    }

    #[test]
    fn test_line_scan_tolerates_blank_lines() {
        let broken = "const items = [\n  label: '\n\n]";
        assert_eq!(sanitize(broken), "const items = [\n  label: ''\n\n]");
    }

    #[test]
    fn test_empty_string_literals_preserved() {
        let valid = "const a = '';\nconst b = \"\";";
        assert_eq!(sanitize(valid), valid);
    }

    #[test]
    fn test_control_chars_stripped() {
        assert_eq!(sanitize("a\u{0}b\u{7f}c"), "abc");
        assert_eq!(sanitize("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```jsx\nconst a = 1;\n```"), "const a = 1;");
        assert_eq!(strip_code_fence("const a = 1;"), "const a = 1;");
    }
}
