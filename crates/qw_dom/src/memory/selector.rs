//! Compound CSS selectors for the in-memory page.
//!
//! Supports a single compound selector: an optional tag name followed by any
//! number of `#id`, `.class`, `[attr]`, `[attr="value"]` and
//! `[attr*="value"]` parts. Combinators are not supported.

/// How an attribute part of a selector matches.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    op: AttributeOp,
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Selector {
    /// Parse `input`, returning `None` for empty or unsupported syntax.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector::default();
        let mut rest = input;

        let (tag, after) = take_ident(rest);
        if !tag.is_empty() {
            selector.tag = Some(tag.to_ascii_lowercase());
            rest = after;
        } else if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        }

        while let Some(c) = rest.chars().next() {
            match c {
                '#' => {
                    let (id, after) = take_ident(&rest[1..]);
                    if id.is_empty() {
                        return None;
                    }
                    selector.id = Some(id.to_string());
                    rest = after;
                }
                '.' => {
                    let (class, after) = take_ident(&rest[1..]);
                    if class.is_empty() {
                        return None;
                    }
                    selector.classes.push(class.to_string());
                    rest = after;
                }
                '[' => {
                    let end = rest.find(']')?;
                    selector.attributes.push(parse_attribute(&rest[1..end])?);
                    rest = &rest[end + 1..];
                }
                _ => return None,
            }
        }

        Some(selector)
    }

    /// Test an element described by its tag and an attribute lookup.
    /// `attribute("class")` must return the space-separated class list.
    pub fn matches<'a, F>(&self, tag: &str, attribute: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if attribute("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let classes = attribute("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|class| classes.split_whitespace().any(|c| c == class))
            {
                return false;
            }
        }

        self.attributes.iter().all(|part| {
            let Some(value) = attribute(part.name.as_str()) else {
                return false;
            };
            match &part.op {
                AttributeOp::Exists => true,
                AttributeOp::Equals(expected) => value == expected,
                AttributeOp::Contains(needle) => !needle.is_empty() && value.contains(needle),
            }
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(input.len(), |(i, _)| i);
    input.split_at(end)
}

fn parse_attribute(body: &str) -> Option<AttributeMatch> {
    let body = body.trim();

    if let Some((name, value)) = body.split_once("*=") {
        return Some(AttributeMatch {
            name: attribute_name(name)?,
            op: AttributeOp::Contains(unquote(value)?),
        });
    }

    if let Some((name, value)) = body.split_once('=') {
        return Some(AttributeMatch {
            name: attribute_name(name)?,
            op: AttributeOp::Equals(unquote(value)?),
        });
    }

    Some(AttributeMatch {
        name: attribute_name(body)?,
        op: AttributeOp::Exists,
    })
}

fn attribute_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

fn unquote(value: &str) -> Option<String> {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return Some(inner.to_string());
        }
    }
    if value.chars().all(is_ident_char) {
        Some(value.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn element<'a>(
        attrs: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<&'a str> {
        move |name: &str| attrs.get(name).copied()
    }

    #[test]
    fn test_parse_class_and_id() {
        let attrs = HashMap::from([("id", "demo-sql"), ("class", "code typing")]);

        assert!(Selector::parse("#demo-sql").unwrap().matches("pre", element(&attrs)));
        assert!(Selector::parse(".typing").unwrap().matches("pre", element(&attrs)));
        assert!(Selector::parse("pre.code.typing").unwrap().matches("pre", element(&attrs)));
        assert!(!Selector::parse("div.code").unwrap().matches("pre", element(&attrs)));
        assert!(!Selector::parse(".missing").unwrap().matches("pre", element(&attrs)));
    }

    #[test]
    fn test_attribute_selectors() {
        let attrs = HashMap::from([
            ("href", "#setup"),
            ("src", "https://www.youtube.com/embed/abc"),
            ("data-tab", "live-demo"),
        ]);

        assert!(Selector::parse("a[href=\"#setup\"]").unwrap().matches("a", element(&attrs)));
        assert!(Selector::parse("[data-tab='live-demo']").unwrap().matches("button", element(&attrs)));
        assert!(Selector::parse("[data-tab=live-demo]").unwrap().matches("button", element(&attrs)));
        assert!(Selector::parse("[data-tab]").unwrap().matches("button", element(&attrs)));
        assert!(Selector::parse("iframe[src*=\"youtube\"]").unwrap().matches("iframe", element(&attrs)));
        assert!(!Selector::parse("[src*=\"vimeo\"]").unwrap().matches("iframe", element(&attrs)));
        assert!(!Selector::parse("[data-tab=\"setup-guide\"]").unwrap().matches("button", element(&attrs)));
    }

    #[test]
    fn test_unsupported_syntax() {
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse(".demo-card .demo-question").is_none());
        assert!(Selector::parse("ul > li").is_none());
        assert!(Selector::parse("[data-tab").is_none());
        assert!(Selector::parse(".").is_none());
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        let attrs = HashMap::new();
        assert!(Selector::parse("IFRAME").unwrap().matches("iframe", element(&attrs)));
        assert!(Selector::parse("*").unwrap().matches("div", element(&attrs)));
    }
}
