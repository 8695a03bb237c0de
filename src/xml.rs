// ABOUTME: Minimal namespace-aware XML element tree built on quick-xml
// ABOUTME: Provides path lookups that substitute a default when an element or attribute is absent

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::collections::HashMap;

use crate::error::{Error, Result};

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const APP_NAMESPACE: &str = "http://www.w3.org/2007/app";

/// Prefix to namespace URI bindings used when resolving lookup paths
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    prefixes: HashMap<String, String>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for `atom:` and `app:`
    pub fn atompub() -> Self {
        Self::new()
            .with("atom", ATOM_NAMESPACE)
            .with("app", APP_NAMESPACE)
    }

    pub fn with(mut self, prefix: &str, uri: &str) -> Self {
        self.prefixes.insert(prefix.to_string(), uri.to_string());
        self
    }

    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Parse a complete document and return its root element.
    ///
    /// Anything short of a single, fully closed root element with every
    /// prefix bound is rejected.
    pub fn parse(source: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(source);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = namespace_uri(resolved)?;

            match event {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(Error::Parse("multiple root elements".to_string()));
                    }
                    stack.push(open_element(namespace, &start)?);
                }
                Event::Empty(start) => {
                    let element = open_element(namespace, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    push_text(&mut stack, &String::from_utf8_lossy(&data))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Parse(format!(
                "document ended inside <{}>",
                open.name
            )));
        }

        root.ok_or_else(|| Error::Parse("document has no root element".to_string()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First descendant matching `path`, e.g. `atom:author/atom:name` or
    /// `atom:link[@rel='edit']`. Paths are relative to this element.
    pub fn find(&self, path: &str, namespaces: &Namespaces) -> Option<&Element> {
        self.find_all(path, namespaces).into_iter().next()
    }

    /// Every descendant matching `path`, in document order
    pub fn find_all(&self, path: &str, namespaces: &Namespaces) -> Vec<&Element> {
        let Some(steps) = compile(path, namespaces) else {
            return Vec::new();
        };

        let mut current = vec![self];
        for step in &steps {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter())
                .filter(|child| step.matches(child))
                .collect();
        }
        current
    }
}

/// Text of the element at `path`, or `default` when it is absent
pub fn find_text(root: &Element, path: &str, namespaces: &Namespaces, default: &str) -> String {
    root.find(path, namespaces)
        .map(|element| element.text.clone())
        .unwrap_or_else(|| default.to_string())
}

/// Attribute `attr` of the element at `path`, or `default` when either is absent
pub fn find_attr(
    root: &Element,
    path: &str,
    attr: &str,
    namespaces: &Namespaces,
    default: &str,
) -> String {
    root.find(path, namespaces)
        .and_then(|element| element.attribute(attr))
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn namespace_uri(resolved: ResolveResult) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => {
            Ok(Some(String::from_utf8_lossy(uri).into_owned()))
        }
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::Parse(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn open_element(namespace: Option<String>, start: &BytesStart) -> Result<Element> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Parse(e.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        ..Default::default()
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::Parse("multiple root elements".to_string())),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(Error::Parse("text outside the root element".to_string())),
    }
    Ok(())
}

struct Step<'p> {
    namespace: Option<&'p str>,
    name: &'p str,
    predicate: Option<(&'p str, &'p str)>,
}

impl Step<'_> {
    fn matches(&self, element: &Element) -> bool {
        element.name == self.name
            && element.namespace.as_deref() == self.namespace
            && self
                .predicate
                .map_or(true, |(attr, value)| element.attribute(attr) == Some(value))
    }
}

/// Split a path into steps, resolving prefixes. An unknown prefix or a
/// malformed predicate yields `None`, which matches nothing.
fn compile<'p>(path: &'p str, namespaces: &'p Namespaces) -> Option<Vec<Step<'p>>> {
    split_steps(path)
        .into_iter()
        .map(|segment| {
            let (tag, predicate) = match segment.split_once('[') {
                Some((tag, rest)) => (tag, Some(parse_predicate(rest)?)),
                None => (segment, None),
            };
            let (namespace, name) = match tag.split_once(':') {
                Some((prefix, name)) => (Some(namespaces.resolve(prefix)?), name),
                None => (None, tag),
            };
            Some(Step {
                namespace,
                name,
                predicate,
            })
        })
        .collect()
}

/// `@rel='edit']` -> `("rel", "edit")`
fn parse_predicate(rest: &str) -> Option<(&str, &str)> {
    let (attr, value) = rest.strip_prefix('@')?.strip_suffix(']')?.split_once('=')?;
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))?;
    Some((attr.trim(), value))
}

/// Split on `/` outside of `[...]` predicates
fn split_steps(path: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in path.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                steps.push(&path[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    steps.push(&path[start..]);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<entry xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">
  <link rel="edit" href="https://blog.example.com/atom/entry/1"/>
  <link rel="alternate" type="text/html" href="https://example.hatenablog.com/entry/1"/>
  <title>Tom &amp; Jerry</title>
  <app:control><app:draft>yes</app:draft></app:control>
  <content type="text/x-markdown"><![CDATA[# heading]]></content>
</entry>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let root = Element::parse(FEED).unwrap();
        assert_eq!(root.name, "entry");
        assert_eq!(root.namespace.as_deref(), Some(ATOM_NAMESPACE));

        let ns = Namespaces::atompub();
        let draft = root.find("app:control/app:draft", &ns).unwrap();
        assert_eq!(draft.namespace.as_deref(), Some(APP_NAMESPACE));
        assert_eq!(draft.text, "yes");
    }

    #[test]
    fn test_find_text_unescapes_and_reads_cdata() {
        let root = Element::parse(FEED).unwrap();
        let ns = Namespaces::atompub();
        assert_eq!(find_text(&root, "atom:title", &ns, ""), "Tom & Jerry");
        assert_eq!(find_text(&root, "atom:content", &ns, ""), "# heading");
    }

    #[test]
    fn test_predicate_selects_link() {
        let root = Element::parse(FEED).unwrap();
        let ns = Namespaces::atompub();
        assert_eq!(
            find_attr(&root, "atom:link[@rel='alternate']", "href", &ns, ""),
            "https://example.hatenablog.com/entry/1"
        );
        assert_eq!(
            find_attr(&root, "atom:link[@rel=\"edit\"]", "href", &ns, ""),
            "https://blog.example.com/atom/entry/1"
        );
    }

    #[test]
    fn test_missing_lookups_use_default() {
        let root = Element::parse(FEED).unwrap();
        let ns = Namespaces::atompub();
        assert_eq!(find_text(&root, "atom:author/atom:name", &ns, "n/a"), "n/a");
        assert_eq!(find_attr(&root, "atom:link[@rel='self']", "href", &ns, ""), "");
        assert_eq!(find_attr(&root, "atom:title", "lang", &ns, "ja"), "ja");
        // unprefixed steps only match elements outside any namespace
        assert_eq!(find_text(&root, "title", &ns, "none"), "none");
        assert_eq!(find_text(&root, "bogus:title", &ns, "none"), "none");
    }

    #[test]
    fn test_split_steps_ignores_slash_in_predicate() {
        assert_eq!(
            split_steps("a:link[@href='http://x/y']/a:b"),
            vec!["a:link[@href='http://x/y']", "a:b"]
        );
    }

    #[test]
    fn test_rejects_malformed_documents() {
        for source in [
            "<not valid xml",
            "<a><b></a>",
            "<a>",
            "",
            "<a/><b/>",
            "<a/>trailing",
            "<x:a/>",
        ] {
            assert!(
                matches!(Element::parse(source), Err(Error::Parse(_))),
                "expected parse error for {:?}",
                source
            );
        }
    }
}
