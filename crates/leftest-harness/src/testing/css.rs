//! The CSS subset understood by [`MemoryDom`](super::MemoryDom).
//!
//! Supports type, `*`, `#id`, `.class`, `[attr]`, `[attr=value]` with
//! quoted or bare values, descendant and `>` combinators, and selector
//! lists.

use crate::selector::split_selector;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

/// One branch of a selector list, rightmost compound last.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Complex {
    pub parts: Vec<(Combinator, Compound)>,
}

pub(crate) fn parse_list(selector: &str) -> Result<Vec<Complex>, String> {
    let branches = split_selector(selector);
    if branches.is_empty() {
        return Err(format!("empty selector {:?}", selector));
    }
    branches.iter().map(|b| parse_complex(b)).collect()
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_complex(branch: &str) -> Result<Complex, String> {
    let chars: Vec<char> = branch.chars().collect();
    let mut pos = 0;
    let mut parts = Vec::new();
    let mut combinator = Combinator::Descendant;
    let mut current = Compound::default();
    let mut current_empty = true;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            ' ' | '\t' | '\n' | '>' => {
                let mut child = false;
                while pos < chars.len() && (chars[pos].is_whitespace() || chars[pos] == '>') {
                    child |= chars[pos] == '>';
                    pos += 1;
                }
                if current_empty {
                    if child {
                        return Err(format!("dangling combinator in {:?}", branch));
                    }
                    continue;
                }
                parts.push((combinator, std::mem::take(&mut current)));
                current_empty = true;
                combinator = if child { Combinator::Child } else { Combinator::Descendant };
            }
            '*' => {
                pos += 1;
                current_empty = false;
            }
            '#' => {
                pos += 1;
                current.id = Some(read_ident(&chars, &mut pos));
                current_empty = false;
            }
            '.' => {
                pos += 1;
                current.classes.push(read_ident(&chars, &mut pos));
                current_empty = false;
            }
            '[' => {
                pos += 1;
                current.attributes.push(parse_attribute(&chars, &mut pos, branch)?);
                current_empty = false;
            }
            c if is_ident(c) => {
                current.tag = Some(read_ident(&chars, &mut pos).to_lowercase());
                current_empty = false;
            }
            other => return Err(format!("unsupported {:?} in selector {:?}", other, branch)),
        }
    }

    if current_empty {
        return Err(format!("dangling combinator in {:?}", branch));
    }
    parts.push((combinator, current));
    Ok(Complex { parts })
}

fn parse_attribute(chars: &[char], pos: &mut usize, branch: &str) -> Result<(String, Option<String>), String> {
    let name = read_ident(chars, pos);
    match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            Ok((name, None))
        }
        Some('=') => {
            *pos += 1;
            let value = match chars.get(*pos) {
                Some(&quote) if quote == '"' || quote == '\'' => {
                    *pos += 1;
                    let mut value = String::new();
                    loop {
                        match chars.get(*pos) {
                            None => return Err(format!("unterminated string in {:?}", branch)),
                            Some('\\') => {
                                if let Some(&escaped) = chars.get(*pos + 1) {
                                    value.push(escaped);
                                }
                                *pos += 2;
                            }
                            Some(&c) if c == quote => {
                                *pos += 1;
                                break;
                            }
                            Some(&c) => {
                                value.push(c);
                                *pos += 1;
                            }
                        }
                    }
                    value
                }
                _ => read_ident(chars, pos),
            };
            if chars.get(*pos) != Some(&']') {
                return Err(format!("unterminated attribute in {:?}", branch));
            }
            *pos += 1;
            Ok((name, Some(value)))
        }
        _ => Err(format!("unsupported attribute operator in {:?}", branch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let list = parse_list("button#save.primary.big[role=\"button\"][disabled]").unwrap();
        let (_, compound) = &list[0].parts[0];
        assert_eq!(compound.tag.as_deref(), Some("button"));
        assert_eq!(compound.id.as_deref(), Some("save"));
        assert_eq!(compound.classes, vec!["primary", "big"]);
        assert_eq!(
            compound.attributes,
            vec![
                ("role".to_string(), Some("button".to_string())),
                ("disabled".to_string(), None)
            ]
        );
    }

    #[test]
    fn test_parse_combinators() {
        let list = parse_list(".x a, ul > li").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].parts.len(), 2);
        assert_eq!(list[1].parts[1].0, Combinator::Child);
    }

    #[test]
    fn test_quoted_values_keep_commas() {
        let list = parse_list("[title='a, b']").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].parts[0].1.attributes[0].1.as_deref(), Some("a, b"));
    }

    #[test]
    fn test_unsupported_syntax() {
        assert!(parse_list("a:hover").is_err());
        assert!(parse_list("").is_err());
        assert!(parse_list("> a").is_err());
    }
}
