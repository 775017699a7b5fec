use ipxact_xml::{Element, XmlError};

use crate::attrs::{AttributeMapping, KEY_ID};

/// Tag of every element in the flattened register map.
pub const NODE_TAG: &str = "node";

/// One `node` element of the flattened register map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputNode {
    attributes: AttributeMapping,
    children: Vec<OutputNode>,
}

impl OutputNode {
    pub fn new(attributes: AttributeMapping) -> Self {
        OutputNode {
            attributes,
            children: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &AttributeMapping {
        &self.attributes
    }

    /// Value of the `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get(KEY_ID)
    }

    pub fn children(&self) -> &[OutputNode] {
        &self.children
    }

    /// Append `child` and return its index among this node's children.
    pub fn push(&mut self, child: OutputNode) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// Child at `index`, which must come from an earlier [`OutputNode::push`].
    pub(crate) fn child_mut(&mut self, index: usize) -> &mut OutputNode {
        &mut self.children[index]
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutputNode::count).sum::<usize>()
    }

    /// Build the equivalent XML element tree.
    pub fn to_element(&self) -> Element {
        let mut element = Element::new(NODE_TAG);
        for (key, value) in self.attributes.iter() {
            element.set_attribute(key, value);
        }
        for child in &self.children {
            element.push_child(child.to_element());
        }
        element
    }

    /// Serialize the subtree as indented XML.
    pub fn to_xml_string(&self, indent: usize) -> Result<String, XmlError> {
        self.to_element().to_pretty_string(indent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_keeps_attribute_order() {
        let attrs: AttributeMapping = [
            ("id", "CTRL"),
            ("address", "0x10"),
            ("permission", "rw"),
            ("mask", "0x0000000f"),
        ]
        .into_iter()
        .collect();
        let mut root = OutputNode::default();
        root.push(OutputNode::new(attrs));

        assert_eq!(root.count(), 2);
        assert_eq!(root.child_mut(0).id(), Some("CTRL"));
        assert_eq!(root.children()[0].id(), Some("CTRL"));
        let xml = root.to_xml_string(2).expect("write");
        assert_eq!(
            xml,
            "<node>\n  <node id=\"CTRL\" address=\"0x10\" permission=\"rw\" mask=\"0x0000000f\"/>\n</node>\n"
        );
    }
}
