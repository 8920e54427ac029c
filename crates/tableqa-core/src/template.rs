//! Question templates with `$index_label` and `$column_label` placeholders.
//!
//! Syntax:
//!
//! - `$name` or `${name}` substitutes a placeholder. `name` is an ASCII
//!   identifier (`[_A-Za-z][_A-Za-z0-9]*`), so in `$index_label的` the name
//!   ends before `的`.
//! - `$$` is a literal `$`.
//! - Any other `$` is an [`InvalidPlaceholder`](TemplateError::InvalidPlaceholder).
//!
//! Only `index_label` (the entity) and `column_label` (the attribute) are
//! defined. Templates are parsed once, so an unknown name fails before any
//! question is produced.
//!
//! # Example
//!
//! ```rust
//! use tableqa_core::template::QuestionTemplate;
//!
//! let t = QuestionTemplate::parse("$index_label的$column_label是什么？").unwrap();
//! assert_eq!(t.render("Apple", "Price"), "Apple的Price是什么？");
//! ```

use std::fmt;

use crate::error::TemplateError;

/// Name bound to the entity.
pub const INDEX_LABEL: &str = "index_label";
/// Name bound to the attribute.
pub const COLUMN_LABEL: &str = "column_label";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    IndexLabel,
    ColumnLabel,
}

/// A parsed template. Rendering is pure string interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl QuestionTemplate {
    /// Parse `source`, resolving every placeholder.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(dollar) = rest.find('$') {
            literal.push_str(&rest[..dollar]);
            let at = offset + dollar;
            let after = &rest[dollar + 1..];

            let (placeholder, consumed) = if after.starts_with('$') {
                literal.push('$');
                (None, 1)
            } else if let Some(braced) = after.strip_prefix('{') {
                let len = identifier_len(braced);
                if len == 0 || !braced[len..].starts_with('}') {
                    return Err(TemplateError::InvalidPlaceholder { offset: at });
                }
                (Some(&braced[..len]), len + 2)
            } else {
                let len = identifier_len(after);
                if len == 0 {
                    return Err(TemplateError::InvalidPlaceholder { offset: at });
                }
                (Some(&after[..len]), len)
            };

            if let Some(name) = placeholder {
                let segment = match name {
                    INDEX_LABEL => Segment::IndexLabel,
                    COLUMN_LABEL => Segment::ColumnLabel,
                    other => {
                        return Err(TemplateError::UnknownPlaceholder {
                            name: other.to_string(),
                            offset: at,
                        })
                    }
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }

            let advance = dollar + 1 + consumed;
            rest = &rest[advance..];
            offset += advance;
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as given to [`parse`](Self::parse).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute `entity` for `$index_label` and `attribute` for `$column_label`.
    pub fn render(&self, entity: &str, attribute: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + entity.len() + attribute.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::IndexLabel => out.push_str(entity),
                Segment::ColumnLabel => out.push_str(attribute),
            }
        }
        out
    }
}

impl fmt::Display for QuestionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for QuestionTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Byte length of the ASCII identifier at the start of `s` (0 if none).
fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_chinese_template() {
        let t = QuestionTemplate::parse("$index_label的$column_label是什么？").unwrap();
        assert_eq!(t.render("苹果", "价格"), "苹果的价格是什么？");
    }

    #[test]
    fn test_render_keyword_template() {
        let t = QuestionTemplate::parse("$index_label, $column_label").unwrap();
        assert_eq!(t.render("Lamp", "Stock"), "Lamp, Stock");
    }

    #[test]
    fn test_braced_placeholders() {
        let t = QuestionTemplate::parse("${index_label}s have ${column_label}?").unwrap();
        assert_eq!(t.render("Apple", "Price"), "Apples have Price?");
    }

    #[test]
    fn test_dollar_escape() {
        let t = QuestionTemplate::parse("Is $index_label over $$5 in $column_label?").unwrap();
        assert_eq!(t.render("Apple", "USD"), "Is Apple over $5 in USD?");
    }

    #[test]
    fn test_placeholders_are_optional_and_repeatable() {
        let t = QuestionTemplate::parse("what about $column_label of $column_label").unwrap();
        assert_eq!(t.render("x", "Price"), "what about Price of Price");
        let plain = QuestionTemplate::parse("no placeholders").unwrap();
        assert_eq!(plain.render("x", "y"), "no placeholders");
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = QuestionTemplate::parse("What is $entity's $column_label?").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                name: "entity".to_string(),
                offset: 8,
            }
        );
    }

    #[test]
    fn test_identifier_is_greedy() {
        let err = QuestionTemplate::parse("$index_labels").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownPlaceholder { ref name, .. } if name == "index_labels"));
    }

    #[test]
    fn test_invalid_placeholders() {
        for src in ["trailing $", "$ space", "$1abc", "${index_label", "${}"] {
            let err = QuestionTemplate::parse(src).unwrap_err();
            assert!(
                matches!(err, TemplateError::InvalidPlaceholder { .. }),
                "expected invalid placeholder for {src:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_multibyte_offsets() {
        let err = QuestionTemplate::parse("价格$bad").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                name: "bad".to_string(),
                offset: "价格".len(),
            }
        );
    }

    #[test]
    fn test_display_round_trips_source() {
        let src = "$index_label / $column_label";
        let t: QuestionTemplate = src.parse().unwrap();
        assert_eq!(t.to_string(), src);
        assert_eq!(t.as_str(), src);
    }
}
