// Untyped response tree. Attributes and child elements share one namespace,
// a tag repeated under one parent becomes a list, an empty element is an
// empty scalar, and mixed text goes under "#text".

use crate::error::AdapterError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Element(Element),
    List(Vec<Node>),
}

/// Ordered mapping from tag (or attribute) name to node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    entries: Vec<(String, Node)>,
}

impl Element {
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Repeated keys collapse into a list, in document order
    pub fn insert(&mut self, key: String, node: Node) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, Node::List(items))) => items.push(node),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Node::List(Vec::new()));
                *existing = Node::List(vec![first, node]);
            }
            None => self.entries.push((key, node)),
        }
    }
}

impl Node {
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Element(element) => element.get(key),
            _ => None,
        }
    }

    pub fn path(&self, keys: &[&str]) -> Option<&Node> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text.as_str()),
            Node::Element(element) => element.get(TEXT_KEY).and_then(Node::text),
            Node::List(_) => None,
        }
    }

    /// Text of a child attribute or element.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::text)
    }

    pub fn keys(&self) -> Vec<String> {
        match self {
            Node::Element(element) => element.keys().map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }
}

/// A parsed backend response: the document node holding the response root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseTree {
    document: Element,
}

impl ResponseTree {
    pub fn parse(xml: &str) -> Result<Self, AdapterError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Frame> = Vec::new();
        let mut document = Element::default();

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => {
                    stack.push(Frame::open(&reader, &start)?);
                }
                Event::Empty(start) => {
                    let frame = Frame::open(&reader, &start)?;
                    let (name, node) = frame.close();
                    parent_of(&mut stack, &mut document).insert(name, node);
                }
                Event::End(_) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| malformed("closing tag without opening tag"))?;
                    let (name, node) = frame.close();
                    parent_of(&mut stack, &mut document).insert(name, node);
                }
                Event::Text(text) => {
                    if let Some(frame) = stack.last_mut() {
                        let decoded = reader.decoder().decode(&text).map_err(malformed)?;
                        frame.text.push_str(&decoded);
                    }
                }
                Event::CData(data) => {
                    if let Some(frame) = stack.last_mut() {
                        let decoded = reader.decoder().decode(&data).map_err(malformed)?;
                        frame.text.push_str(&decoded);
                    }
                }
                Event::GeneralRef(reference) => {
                    if let Some(frame) = stack.last_mut() {
                        match reference.resolve_char_ref().map_err(malformed)? {
                            Some(ch) => frame.text.push(ch),
                            None => {
                                let name =
                                    reader.decoder().decode(&reference).map_err(malformed)?;
                                match quick_xml::escape::resolve_predefined_entity(&name) {
                                    Some(value) => frame.text.push_str(value),
                                    None => {
                                        frame.text.push('&');
                                        frame.text.push_str(&name);
                                        frame.text.push(';');
                                    }
                                }
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.name)));
        }
        if document.is_empty() {
            return Err(malformed("document has no root element"));
        }

        Ok(Self { document })
    }

    pub fn get(&self, tag: &str) -> Option<&Node> {
        self.document.get(tag)
    }

    /// Top-level tags present, for diagnostics.
    pub fn keys(&self) -> Vec<String> {
        self.document.keys().map(str::to_string).collect()
    }
}

/// First candidate tag present at the top of the tree.
pub fn find_root<'a>(tree: &'a ResponseTree, candidates: &[&str]) -> Option<&'a Node> {
    candidates.iter().find_map(|tag| tree.get(tag))
}

/// Absent -> empty, list -> its items, anything else -> one item.
pub fn as_sequence(node: Option<&Node>) -> Vec<&Node> {
    match node {
        None => Vec::new(),
        Some(Node::List(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

struct Frame {
    name: String,
    element: Element,
    text: String,
}

impl Frame {
    fn open(reader: &Reader<&[u8]>, start: &BytesStart) -> Result<Self, AdapterError> {
        let decoder = reader.decoder();
        let name = decoder
            .decode(start.name().as_ref())
            .map_err(malformed)?
            .into_owned();
        let mut element = Element::default();

        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = decoder.decode(attribute.key.as_ref()).map_err(malformed)?;
            let value = attribute
                .decode_and_unescape_value(decoder)
                .map_err(malformed)?;
            element.insert(key.into_owned(), Node::Scalar(value.into_owned()));
        }

        Ok(Self {
            name,
            element,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Node) {
        let text = self.text.trim();
        let node = if self.element.is_empty() {
            Node::Scalar(text.to_string())
        } else {
            let mut element = self.element;
            if !text.is_empty() {
                element.insert(TEXT_KEY.to_string(), Node::Scalar(text.to_string()));
            }
            Node::Element(element)
        };
        (self.name, node)
    }
}

fn parent_of<'a>(stack: &'a mut [Frame], document: &'a mut Element) -> &'a mut Element {
    match stack.last_mut() {
        Some(frame) => &mut frame.element,
        None => document,
    }
}

fn malformed(error: impl ToString) -> AdapterError {
    AdapterError::UpstreamUnavailable(format!("malformed response: {}", error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_attributes_and_children_share_namespace() {
        let tree = ResponseTree::parse(
            r#"<Root><City Id="7" Name="Brasov"><RegionName>Brasov</RegionName></City></Root>"#,
        )
        .unwrap();

        let city = tree.get("Root").and_then(|r| r.get("City")).unwrap();
        assert_eq!(city.field("Id"), Some("7"));
        assert_eq!(city.field("Name"), Some("Brasov"));
        assert_eq!(city.field("RegionName"), Some("Brasov"));
        assert_eq!(city.keys(), vec!["Id", "Name", "RegionName"]);
    }

    #[test]
    fn test_repeated_tags_collapse_into_list() {
        let tree = ResponseTree::parse(
            "<Root><Row><Seat N=\"1\"/><Seat N=\"2\"/><Seat N=\"3\"/></Row></Root>",
        )
        .unwrap();

        let seats = tree.get("Root").and_then(|r| r.path(&["Row", "Seat"]));
        match seats {
            Some(Node::List(items)) => {
                let numbers: Vec<_> = items.iter().filter_map(|s| s.field("N")).collect();
                assert_eq!(numbers, vec!["1", "2", "3"]);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_element_is_empty_scalar() {
        let tree = ResponseTree::parse("<Root><Success/><Other></Other></Root>").unwrap();
        let root = tree.get("Root").unwrap();
        assert_eq!(root.get("Success"), Some(&Node::Scalar(String::new())));
        assert_eq!(root.field("Other"), Some(""));
    }

    #[test]
    fn test_mixed_text_and_entities() {
        let tree = ResponseTree::parse(
            r#"<?xml version="1.0" encoding="utf-8"?><Root><Warning Code="1">Fara curse &amp; locuri &#x41;</Warning></Root>"#,
        )
        .unwrap();

        let warning = tree.get("Root").and_then(|r| r.get("Warning")).unwrap();
        assert_eq!(warning.field("Code"), Some("1"));
        assert_eq!(warning.text(), Some("Fara curse & locuri A"));
    }

    #[test]
    fn test_keys_report_top_level_tags() {
        let tree = ResponseTree::parse("<Unexpected><A/></Unexpected>").unwrap();
        assert_eq!(tree.keys(), vec!["Unexpected"]);
    }

    #[test_case("<Root><A></Root>"; "mismatched close")]
    #[test_case("<Root><A>"; "unclosed")]
    #[test_case("Comanda necunoscuta"; "plain text")]
    #[test_case(""; "empty")]
    fn test_malformed_documents(xml: &str) {
        let result = ResponseTree::parse(xml);
        assert!(
            matches!(result, Err(AdapterError::UpstreamUnavailable(_))),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_find_root_tries_candidates_in_order() {
        let tree = ResponseTree::parse("<REZMax_getBusSeatsRS><Bus/></REZMax_getBusSeatsRS>").unwrap();

        let root = find_root(&tree, &["REZMax_GetBusSeatsRS", "REZMax_getBusSeatsRS"]);
        assert!(root.is_some());
        assert!(find_root(&tree, &["REZMax_GetBusSeatsRS"]).is_none());
        assert!(find_root(&tree, &[]).is_none());
    }

    #[test]
    fn test_as_sequence_cardinality() {
        let single = Node::Scalar("x".to_string());
        let list = Node::List(vec![Node::Scalar("a".into()), Node::Scalar("b".into())]);

        assert!(as_sequence(None).is_empty());
        assert_eq!(as_sequence(Some(&single)), vec![&single]);

        let items = as_sequence(Some(&list));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text(), Some("b"));

        // re-coercing an already coerced item is a no-op
        let again: Vec<&Node> = items.iter().flat_map(|n| as_sequence(Some(*n))).collect();
        assert_eq!(again, items);
    }
}
