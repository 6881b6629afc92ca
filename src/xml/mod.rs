pub mod dom;
pub mod path;

pub use dom::{Attribute, NodeId, XmlDocument, XmlNode, is_xml_name};
pub use path::resolve_path;
