mod writer;
mod xml;

pub use writer::write_xml_document;
pub use xml::*;
