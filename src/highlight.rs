//! Lexical SQL highlighting.
//!
//! This is pattern substitution, not parsing. The passes run in a fixed
//! order over a fragment tree:
//!
//! 1. single-quoted string literals
//! 2. keywords
//! 3. function names (nested inside keyword spans where the sets overlap)
//! 4. numeric literals
//!
//! String literal spans are opaque: later passes never look inside them.
//! Text is HTML-escaped when the tree is rendered, so SQL content can never
//! inject markup.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Words wrapped in a `sql-keyword` span, matched case-insensitively.
pub const KEYWORDS: &[&str] = &[
    "SELECT",
    "FROM",
    "JOIN",
    "ON",
    "WHERE",
    "AND",
    "OR",
    "GROUP",
    "BY",
    "ORDER",
    "LIMIT",
    "AS",
    "IN",
    "IS",
    "NULL",
    "INNER",
    "LEFT",
    "RIGHT",
    "OUTER",
    "DESC",
    "ASC",
    "WITH",
    "HAVING",
    "CASE",
    "WHEN",
    "THEN",
    "END",
    "EXTRACT",
    "YEAR",
    "QUARTER",
    "DATEDIFF",
    "CURDATE",
    "COALESCE",
    "NULLIF",
    "ROUND",
    "DISTINCT",
    "CURRENT_DATE",
    "COUNT",
    "SUM",
    "AVG",
];

/// Words wrapped in a `sql-func` span, matched case-insensitively.
pub const FUNCTIONS: &[&str] = &["COUNT", "SUM", "AVG", "MIN", "MAX", "STRFTIME", "DATE"];

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[^']*'").expect("invalid regex"));
static KEYWORD: LazyLock<Regex> = LazyLock::new(|| word_set(KEYWORDS));
static FUNCTION: LazyLock<Regex> = LazyLock::new(|| word_set(FUNCTIONS));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]+\.?[0-9]*\b").expect("invalid regex"));

fn word_set(words: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("invalid regex")
}

/// Token category of a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    String,
    Keyword,
    Function,
    Number,
}

impl TokenClass {
    /// CSS class the landing page styles.
    pub fn css_class(&self) -> &'static str {
        match self {
            TokenClass::String => "sql-string",
            TokenClass::Keyword => "sql-keyword",
            TokenClass::Function => "sql-func",
            TokenClass::Number => "sql-number",
        }
    }
}

/// A node of the highlight tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Span {
        class: TokenClass,
        children: Vec<Fragment>,
    },
}

impl Fragment {
    fn push_plain_text(&self, out: &mut String) {
        match self {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Span { children, .. } => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
        }
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Fragment::Text(text) => push_escaped(text, out),
            Fragment::Span { class, children } => {
                out.push_str("<span class=\"");
                out.push_str(class.css_class());
                out.push_str("\">");
                for child in children {
                    child.write_markup(out);
                }
                out.push_str("</span>");
            }
        }
    }
}

/// Highlighted SQL, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlighted {
    fragments: Vec<Fragment>,
}

impl Highlighted {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Render as HTML markup with `<span class="sql-…">` wrappers.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            fragment.write_markup(&mut out);
        }
        out
    }

    /// The original text with all highlighting removed.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            fragment.push_plain_text(&mut out);
        }
        out
    }
}

impl fmt::Display for Highlighted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// Run the highlighting passes over `sql`.
pub fn highlight(sql: &str) -> Highlighted {
    if sql.is_empty() {
        return Highlighted::default();
    }

    let fragments = vec![Fragment::Text(sql.to_string())];
    let fragments = wrap_matches(fragments, &STRING_LITERAL, TokenClass::String);
    let fragments = wrap_matches(fragments, &KEYWORD, TokenClass::Keyword);
    let fragments = wrap_matches(fragments, &FUNCTION, TokenClass::Function);
    let fragments = wrap_matches(fragments, &NUMBER, TokenClass::Number);

    Highlighted { fragments }
}

/// Shorthand for `highlight(sql).to_markup()`.
pub fn highlight_markup(sql: &str) -> String {
    highlight(sql).to_markup()
}

/// Escape text for a double-quoted HTML attribute value.
pub fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            _ => push_escaped_char(c, &mut out),
        }
    }
    out
}

/// Escape text the way the browser serializes a text node.
fn push_escaped(text: &str, out: &mut String) {
    for c in text.chars() {
        push_escaped_char(c, out);
    }
}

fn push_escaped_char(c: char, out: &mut String) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(c),
    }
}

fn wrap_matches(fragments: Vec<Fragment>, pattern: &Regex, class: TokenClass) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => split_text(&text, pattern, class, &mut out),
            Fragment::Span {
                class: TokenClass::String,
                ..
            } => out.push(fragment),
            Fragment::Span {
                class: outer,
                children,
            } => out.push(Fragment::Span {
                class: outer,
                children: wrap_matches(children, pattern, class),
            }),
        }
    }
    out
}

fn split_text(text: &str, pattern: &Regex, class: TokenClass, out: &mut Vec<Fragment>) {
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            out.push(Fragment::Text(text[last..found.start()].to_string()));
        }
        out.push(Fragment::Span {
            class,
            children: vec![Fragment::Text(found.as_str().to_string())],
        });
        last = found.end();
    }
    if last < text.len() {
        out.push(Fragment::Text(text[last..].to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EXAMPLES;

    fn span(class: TokenClass, text: &str) -> Fragment {
        Fragment::Span {
            class,
            children: vec![Fragment::Text(text.to_string())],
        }
    }

    fn text(t: &str) -> Fragment {
        Fragment::Text(t.to_string())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(highlight_markup(""), "");
        assert!(highlight("").fragments().is_empty());
    }

    #[test]
    fn test_keyword_inside_literal_stays_a_string() {
        let out = highlight_markup("SELECT * FROM t WHERE x = 'SELECT'");
        assert_eq!(
            out,
            "<span class=\"sql-keyword\">SELECT</span> * \
             <span class=\"sql-keyword\">FROM</span> t \
             <span class=\"sql-keyword\">WHERE</span> x = \
             <span class=\"sql-string\">'SELECT'</span>"
        );
    }

    #[test]
    fn test_function_nests_inside_keyword() {
        let highlighted = highlight("COUNT(o.orderID)");
        assert_eq!(
            highlighted.fragments(),
            &[
                Fragment::Span {
                    class: TokenClass::Keyword,
                    children: vec![span(TokenClass::Function, "COUNT")],
                },
                text("(o.orderID)"),
            ]
        );
        assert_eq!(
            highlighted.to_markup(),
            "<span class=\"sql-keyword\"><span class=\"sql-func\">COUNT</span></span>(o.orderID)"
        );
    }

    #[test]
    fn test_function_only_names() {
        let highlighted = highlight("max(price)");
        assert_eq!(highlighted.fragments()[0], span(TokenClass::Function, "max"));
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let out = highlight_markup("select a as b");
        assert_eq!(
            out,
            "<span class=\"sql-keyword\">select</span> a \
             <span class=\"sql-keyword\">as</span> b"
        );
    }

    #[test]
    fn test_word_boundaries() {
        // "order_count" and "segment" contain keywords only as substrings
        let out = highlight_markup("order_count segment fromage");
        assert!(!out.contains("<span"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            highlight("LIMIT 5;").fragments(),
            &[
                span(TokenClass::Keyword, "LIMIT"),
                text(" "),
                span(TokenClass::Number, "5"),
                text(";"),
            ]
        );
        assert_eq!(
            highlight("x * 1.5").fragments()[1],
            span(TokenClass::Number, "1.5")
        );
        // Digits glued to identifiers are not numbers
        assert!(!highlight_markup("q4_2024_revenue").contains("sql-number"));
    }

    #[test]
    fn test_number_inside_literal_is_not_highlighted() {
        let out = highlight_markup("'2024'");
        assert_eq!(out, "<span class=\"sql-string\">'2024'</span>");
    }

    #[test]
    fn test_markup_is_escaped() {
        let out = highlight_markup("a < b AND c > '<script>'");
        assert_eq!(
            out,
            "a &lt; b <span class=\"sql-keyword\">AND</span> c &gt; \
             <span class=\"sql-string\">'&lt;script&gt;'</span>"
        );
        assert_eq!(escape_attribute("\"&\""), "&quot;&amp;&quot;");
    }

    #[test]
    fn test_double_quotes_stay_literal_in_markup() {
        let out = highlight_markup("SELECT \"name\" FROM t");
        assert_eq!(
            out,
            "<span class=\"sql-keyword\">SELECT</span> \"name\" \
             <span class=\"sql-keyword\">FROM</span> t"
        );
    }

    #[test]
    fn test_unterminated_literal_during_reveal() {
        let out = highlight_markup("WHERE c.city = 'Lon");
        assert_eq!(
            out,
            "<span class=\"sql-keyword\">WHERE</span> c.city = 'Lon"
        );
    }

    #[test]
    fn test_plain_text_is_preserved() {
        for example in EXAMPLES.iter() {
            assert_eq!(highlight(example.sql).plain_text(), example.sql);
        }
    }

    #[test]
    fn test_display_matches_markup() {
        let highlighted = highlight("SUM(x)");
        assert_eq!(highlighted.to_string(), highlighted.to_markup());
    }
}
