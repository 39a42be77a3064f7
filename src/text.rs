//! Small text helpers shared by the command cards and the news poller.

/// Removes HTML tags and decodes the handful of entities news feeds use.
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

/// Cuts `text` to `max_chars` characters, appending `...` if anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut snippet: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        snippet.push_str("...");
    }
    snippet
}

/// Formats a number with thousands separators, e.g. `12,345.67`.
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Splits command input on whitespace; double quotes group words into one token.
pub fn split_args(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let html = "<p>New <b>league</b> &amp; patch notes</p>";
        assert_eq!(strip_html(html), "New league & patch notes");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("Ørb of Ännulment", 4), "Ørb ...");
    }

    #[test]
    fn formats_numbers_with_grouping() {
        assert_eq!(format_number(2300.0, 2), "2,300.00");
        assert_eq!(format_number(12.777, 2), "12.78");
        assert_eq!(format_number(1234567.0, 0), "1,234,567");
        assert_eq!(format_number(-1500.5, 1), "-1,500.5");
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn splits_quoted_arguments() {
        assert_eq!(
            split_args(r#"10 "Divine Orb"  500 chaos"#),
            vec!["10", "Divine Orb", "500", "chaos"]
        );
        assert!(split_args("   ").is_empty());
        assert_eq!(split_args(r#"1 """#), vec!["1", ""]);
    }
}
