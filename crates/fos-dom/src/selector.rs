//! Selector matching
//!
//! Supports selector lists of complex selectors built from compounds of
//! type/universal, `#id`, `.class` and attribute selectors, joined by the
//! descendant and child combinators. Pseudo-classes are rejected.

use crate::{DomError, DomTree, NodeId};

/// Parsed selector list (`a, b > c`)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<Vec<SelectorPart>>,
}

/// One compound in a complex selector
#[derive(Debug, Clone, PartialEq)]
struct SelectorPart {
    compound: Compound,
    /// Relation to the part on the left
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeMatcher {
    /// [attr=value]
    Exact(String),
    /// [attr~=value]
    Contains(String),
    /// [attr|=value]
    DashMatch(String),
    /// [attr^=value]
    Prefix(String),
    /// [attr$=value]
    Suffix(String),
    /// [attr*=value]
    Substring(String),
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(val) = value else { return false };
        match &self.matcher {
            None => true,
            Some(AttributeMatcher::Exact(expected)) => val == expected,
            Some(AttributeMatcher::Contains(expected)) => {
                val.split_whitespace().any(|w| w == expected)
            }
            Some(AttributeMatcher::DashMatch(expected)) => {
                val == expected
                    || val
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Some(AttributeMatcher::Prefix(expected)) => {
                !expected.is_empty() && val.starts_with(expected.as_str())
            }
            Some(AttributeMatcher::Suffix(expected)) => {
                !expected.is_empty() && val.ends_with(expected.as_str())
            }
            Some(AttributeMatcher::Substring(expected)) => {
                !expected.is_empty() && val.contains(expected.as_str())
            }
        }
    }
}

impl SelectorList {
    /// Does `node` match any selector in the list?
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|parts| matches_from(tree, parts, parts.len() - 1, node))
    }
}

fn matches_from(tree: &DomTree, parts: &[SelectorPart], idx: usize, node: NodeId) -> bool {
    if !compound_matches(tree, &parts[idx].compound, node) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    match parts[idx].combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => tree
            .parent_element(node)
            .is_some_and(|parent| matches_from(tree, parts, idx - 1, parent)),
        Combinator::Descendant => {
            let mut current = tree.parent_element(node);
            while let Some(ancestor) = current {
                if matches_from(tree, parts, idx - 1, ancestor) {
                    return true;
                }
                current = tree.parent_element(ancestor);
            }
            false
        }
    }
}

fn compound_matches(tree: &DomTree, compound: &Compound, node: NodeId) -> bool {
    let Some(elem) = tree.get(node).and_then(|n| n.as_element()) else {
        return false;
    };

    if let Some(tag) = &compound.tag {
        if !elem.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if elem.id.as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    compound.classes.iter().all(|c| elem.has_class(c))
        && compound
            .attrs
            .iter()
            .all(|attr| attr.matches(elem.get_attr(&attr.name)))
}

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> Result<SelectorList, DomError> {
    let groups = split_top_level(input, ',');
    let mut selectors = Vec::with_capacity(groups.len());
    for group in groups {
        selectors.push(parse_complex(group.trim(), input)?);
    }
    Ok(SelectorList { selectors })
}

fn invalid(input: &str) -> DomError {
    DomError::InvalidSelector(input.to_string())
}

/// Split on `sep` outside of brackets and quotes
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                out.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&input[start..]);
    out
}

/// Break a complex selector into compound tokens and `>` tokens
fn tokenize(selector: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in selector.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if depth > 0 => {
                quote = Some(c);
                current.push(c);
            }
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '>' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(">".to_string());
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_complex(selector: &str, whole: &str) -> Result<Vec<SelectorPart>, DomError> {
    if selector.is_empty() {
        return Err(invalid(whole));
    }

    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(selector) {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(invalid(whole));
            }
            pending = Some(Combinator::Child);
            continue;
        }

        let compound = parse_compound(&token).ok_or_else(|| invalid(whole))?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart {
            compound,
            combinator,
        });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(invalid(whole));
    }
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Split a leading identifier off `s`
fn take_ident(s: &str) -> Option<(&str, &str)> {
    let end = s
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(s.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    Some(s.split_at(end))
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = token;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else if rest.starts_with(is_ident_char) {
        let (tag, after) = take_ident(rest)?;
        compound.tag = Some(tag.to_ascii_lowercase());
        rest = after;
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '#' => {
                let (id, after) = take_ident(&rest[1..])?;
                compound.id = Some(id.to_string());
                rest = after;
            }
            '.' => {
                let (class, after) = take_ident(&rest[1..])?;
                compound.classes.push(class.to_string());
                rest = after;
            }
            '[' => {
                let close = find_closing_bracket(rest)?;
                compound.attrs.push(parse_attribute(&rest[1..close])?);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn find_closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attribute(inner: &str) -> Option<AttributeSelector> {
    let inner = inner.trim();
    let Some(eq) = inner.find('=') else {
        let (name, rest) = take_ident(inner)?;
        if !rest.trim().is_empty() {
            return None;
        }
        return Some(AttributeSelector {
            name: name.to_ascii_lowercase(),
            matcher: None,
        });
    };

    let lhs = inner[..eq].trim_end();
    let value = unquote(inner[eq + 1..].trim())?;
    let (name, op) = match lhs.chars().last()? {
        c @ ('~' | '|' | '^' | '$' | '*') => (&lhs[..lhs.len() - 1], Some(c)),
        _ => (lhs, None),
    };
    let (name, rest) = take_ident(name.trim())?;
    if !rest.is_empty() {
        return None;
    }

    let matcher = match op {
        None => AttributeMatcher::Exact(value),
        Some('~') => AttributeMatcher::Contains(value),
        Some('|') => AttributeMatcher::DashMatch(value),
        Some('^') => AttributeMatcher::Prefix(value),
        Some('$') => AttributeMatcher::Suffix(value),
        Some(_) => AttributeMatcher::Substring(value),
    };
    Some(AttributeSelector {
        name: name.to_ascii_lowercase(),
        matcher: Some(matcher),
    })
}

fn unquote(value: &str) -> Option<String> {
    for q in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(q) {
            return inner.strip_suffix(q).map(str::to_string);
        }
    }
    if value.is_empty() || !value.chars().all(is_ident_char) {
        return None;
    }
    Some(value.to_string())
}
