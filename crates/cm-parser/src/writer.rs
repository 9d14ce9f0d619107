use xmlwriter::{Indent, Options, XmlWriter};

use crate::xml::{XmlElementNode, XmlNode};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Pretty prints an element tree with a stable 4-space layout.
///
/// Elements holding a single text child are written on one line, empty elements are
/// self-closed. Parsing the output and writing it again yields the same text.
pub fn write_xml_document(root: &XmlElementNode) -> String {
    let mut xml = XmlWriter::new(Options {
        use_single_quote: false,
        indent: Indent::Spaces(4),
        attributes_indent: Indent::None,
    });
    write_element(root, &mut xml);
    let body = xml.end_document();

    let mut out = String::with_capacity(DECLARATION.len() + body.len() + 1);
    out.push_str(DECLARATION);
    out.push_str(body.trim());
    out.push('\n');
    out
}

fn write_element(element: &XmlElementNode, xml: &mut XmlWriter) {
    xml.start_element(&element.name);
    for (name, value) in &element.attributes {
        xml.write_attribute_raw(name, |buf| escape_attribute(value, buf));
    }

    let visible = element
        .children
        .iter()
        .filter(|child| match child {
            XmlNode::Element(_) => true,
            XmlNode::Text(text) => !text.value.trim().is_empty(),
        })
        .collect::<Vec<_>>();

    match visible.as_slice() {
        [] => xml.end_element(),
        [XmlNode::Text(text)] => {
            // Keeps the text on the element's own line, byte for byte.
            xml.set_preserve_whitespaces(true);
            xml.write_text(&escape_text(&text.value));
            xml.end_element();
            xml.set_preserve_whitespaces(false);
        }
        children => {
            for child in children {
                match child {
                    XmlNode::Element(child) => write_element(child, xml),
                    XmlNode::Text(text) => xml.write_text(&escape_text(text.value.trim())),
                }
            }
            xml.end_element();
        }
    }
}

/// Written raw so that tabs and line breaks survive attribute value normalization.
fn escape_attribute(value: &str, buf: &mut Vec<u8>) {
    for ch in value.chars() {
        match ch {
            '&' => buf.extend_from_slice(b"&amp;"),
            '<' => buf.extend_from_slice(b"&lt;"),
            '>' => buf.extend_from_slice(b"&gt;"),
            '"' => buf.extend_from_slice(b"&quot;"),
            '\t' => buf.extend_from_slice(b"&#9;"),
            '\n' => buf.extend_from_slice(b"&#10;"),
            '\r' => buf.extend_from_slice(b"&#13;"),
            _ => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
}

/// `<` is escaped by the writer; everything else a text node needs is done here.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
    out
}
