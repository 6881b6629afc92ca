use crate::{
    error::{FxStudioError, FxStudioResult},
    xml::dom::{NodeId, XmlDocument, XmlNode},
};

/// Positional path of `node` from the document node, e.g. `/*[1]/*[2]/@*`.
///
/// Each step's index counts only preceding siblings that share the node's tag name
/// (self inclusive), not the absolute child index. Attributes resolve to their owner's path
/// plus `/@*`, so two attributes of one element share a path. A node without a parent
/// (the document node or a detached element) resolves to the empty string.
pub fn resolve_path(doc: &XmlDocument, node: XmlNode) -> FxStudioResult<String> {
    match node {
        XmlNode::Attribute { owner, index } => {
            if !doc.contains(owner) || index >= doc.attributes(owner).len() {
                return Err(FxStudioError::invariant(format!(
                    "attribute {index} of node {} is not part of this document",
                    owner.index()
                )));
            }
            Ok(format!("{}/@*", element_path(doc, owner)?))
        }
        XmlNode::Element(id) => element_path(doc, id),
    }
}

fn element_path(doc: &XmlDocument, id: NodeId) -> FxStudioResult<String> {
    if !doc.contains(id) {
        return Err(FxStudioError::invariant(format!(
            "node {} is not part of this document",
            id.index()
        )));
    }
    let Some(parent) = doc.parent(id) else {
        return Ok(String::new());
    };
    Ok(format!(
        "{}/*[{}]",
        element_path(doc, parent)?,
        position_among_namesakes(doc, parent, id)?
    ))
}

/// 1-based position of `child` among the children of `parent` carrying the same name.
fn position_among_namesakes(
    doc: &XmlDocument,
    parent: NodeId,
    child: NodeId,
) -> FxStudioResult<usize> {
    let name = doc.name(child);
    let mut count = 1;
    for &sibling in doc.children(parent) {
        if sibling == child {
            return Ok(count);
        }
        if doc.name(sibling) == name {
            count += 1;
        }
    }
    Err(FxStudioError::invariant(format!(
        "node {} not found among the children of its parent {}",
        child.index(),
        parent.index()
    )))
}
