//! XML reading and writing for [`DocumentTree`].
//!
//! Reading keeps every element, attribute (including `xmlns*` declarations),
//! text, CDATA and comment inside the root element. The prolog is regenerated
//! on write as a UTF-8 declaration.

use super::{Attribute, DocumentTree, NodeId, NodeKind, QName};
use crate::WeaveError;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

// ============================================================================
// READER
// ============================================================================

pub(super) fn read(input: &[u8]) -> Result<DocumentTree, WeaveError> {
    let mut reader = Reader::from_reader(input);
    // Indentation is dropped below; significant whitespace inside text is kept.
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut tree: Option<DocumentTree> = None;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let id = open_element(&mut tree, &stack, e)?;
                stack.push(id);
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing element - open without pushing
                open_element(&mut tree, &stack, e)?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(tree), Some(parent)) = (tree.as_mut(), stack.last()) {
                    let text = e
                        .unescape()
                        .map_err(|e| WeaveError::xml(format!("Text error: {e}")))?;
                    if !text.trim().is_empty() {
                        tree.append_raw(*parent, NodeKind::Text(text.into_owned()));
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if let (Some(tree), Some(parent)) = (tree.as_mut(), stack.last()) {
                    let data = std::str::from_utf8(e)
                        .map_err(|e| WeaveError::xml(format!("Invalid CDATA: {e}")))?;
                    tree.append_raw(*parent, NodeKind::CData(data.to_string()));
                }
            }
            Ok(Event::Comment(ref e)) => {
                if let (Some(tree), Some(parent)) = (tree.as_mut(), stack.last()) {
                    let comment = String::from_utf8_lossy(e).into_owned();
                    tree.append_raw(*parent, NodeKind::Comment(comment));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(WeaveError::xml(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(WeaveError::xml("Unexpected end of document: unclosed elements"));
    }
    tree.ok_or_else(|| WeaveError::xml("Document has no root element"))
}

fn open_element(
    tree: &mut Option<DocumentTree>,
    stack: &[NodeId],
    e: &BytesStart<'_>,
) -> Result<NodeId, WeaveError> {
    let tag = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| WeaveError::xml(format!("Invalid tag name: {e}")))?
        .to_string();
    let attributes = read_attributes(e)?;

    match (tree.as_mut(), stack.last()) {
        (None, _) => {
            let mut doc = DocumentTree::new(QName::parse(&tag));
            let root = doc.root();
            if let Some(slot) = doc.attributes_mut(root) {
                *slot = attributes;
            }
            *tree = Some(doc);
            Ok(root)
        }
        (Some(doc), Some(parent)) => {
            let id = doc.append_element(*parent, QName::parse(&tag));
            if let Some(slot) = doc.attributes_mut(id) {
                *slot = attributes;
            }
            Ok(id)
        }
        (Some(_), None) => Err(WeaveError::xml(format!(
            "Multiple root elements: unexpected <{tag}>"
        ))),
    }
}

fn read_attributes(e: &BytesStart<'_>) -> Result<Vec<Attribute>, WeaveError> {
    let mut out = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| WeaveError::xml(format!("Attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| WeaveError::xml(format!("Attribute key error: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| WeaveError::xml(format!("Attribute value error: {e}")))?
            .to_string();
        out.push(Attribute::new(QName::parse(key), value));
    }
    Ok(out)
}

// ============================================================================
// WRITER
// ============================================================================

pub(super) fn write(tree: &DocumentTree) -> Result<Vec<u8>, WeaveError> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| WeaveError::xml(format!("Write error: {e}")))?;

    write_node(&mut writer, tree, tree.root())?;

    let mut output = buffer.into_inner();
    output.push(b'\n');
    Ok(output)
}

fn write_node<W: std::io::Write>(
    writer: &mut Writer<W>,
    tree: &DocumentTree,
    id: NodeId,
) -> Result<(), WeaveError> {
    let event = match tree.kind(id) {
        NodeKind::Element { name, attributes } => {
            let tag = name.to_string();
            let mut start = BytesStart::new(tag.clone());
            for attr in attributes {
                let key = attr.name.to_string();
                start.push_attribute((key.as_str(), attr.value.as_str()));
            }

            if tree.children(id).is_empty() {
                Event::Empty(start)
            } else {
                emit(writer, Event::Start(start))?;
                for child in tree.children(id) {
                    write_node(writer, tree, *child)?;
                }
                Event::End(BytesEnd::new(tag))
            }
        }
        NodeKind::Text(text) => Event::Text(BytesText::new(text)),
        NodeKind::CData(data) => Event::CData(BytesCData::new(data.as_str())),
        NodeKind::Comment(comment) => Event::Comment(BytesText::from_escaped(comment.as_str())),
    };
    emit(writer, event)
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), WeaveError> {
    writer
        .write_event(event)
        .map_err(|e| WeaveError::xml(format!("Write error: {e}")))
}
