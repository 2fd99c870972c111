//! Metadata forwarded from upstream of the writer.
//!
//! Metadata is a tree of named string values. The writer only reads it: header values marked
//! `FORWARD` come from the root's children, and forwarded vlrs are found by searching the
//! whole tree.

/// A named metadata value with children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataNode {
    name: String,
    value: String,
    children: Vec<MetadataNode>,
}

impl MetadataNode {
    /// Creates a new node without children.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::MetadataNode;
    /// let node = MetadataNode::new("minor_version", "4");
    /// assert_eq!("4", node.value());
    /// ```
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> MetadataNode {
        MetadataNode {
            name: name.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Adds a child, returning this node.
    pub fn with_child(mut self, child: MetadataNode) -> MetadataNode {
        self.children.push(child);
        self
    }

    /// Adds a child.
    pub fn add_child(&mut self, child: MetadataNode) {
        self.children.push(child);
    }

    /// This node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This node's value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// This node's children.
    pub fn children(&self) -> &[MetadataNode] {
        &self.children
    }

    /// Returns the first direct child with this name.
    pub fn child(&self, name: &str) -> Option<&MetadataNode> {
        self.find_child(|node| node.name == name)
    }

    /// Returns the first direct child matching the predicate.
    pub fn find_child<P: Fn(&MetadataNode) -> bool>(&self, predicate: P) -> Option<&MetadataNode> {
        self.children.iter().find(|node| predicate(node))
    }

    /// Returns the first node matching the predicate, depth first, starting with this node.
    pub fn find<P: Fn(&MetadataNode) -> bool>(&self, predicate: P) -> Option<&MetadataNode> {
        self.find_by(&predicate)
    }

    fn find_by<P: Fn(&MetadataNode) -> bool>(&self, predicate: &P) -> Option<&MetadataNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by(predicate))
    }
}

/// Finds the metadata describing a vlr with this record id and user id.
///
/// The match is a node whose name starts with `vlr`, in any case, that has a `record_id` child
/// equal to the decimal record id and a `user_id` child equal to the user id.
///
/// # Examples
///
/// ```
/// use las_writer::{MetadataNode, metadata::find_vlr_metadata};
/// let root = MetadataNode::new("root", "").with_child(
///     MetadataNode::new("vlr_0", "aGVsbG8=")
///         .with_child(MetadataNode::new("record_id", "42"))
///         .with_child(MetadataNode::new("user_id", "someone")),
/// );
/// assert_eq!("aGVsbG8=", find_vlr_metadata(&root, 42, "someone").unwrap().value());
/// assert!(find_vlr_metadata(&root, 43, "someone").is_none());
/// ```
pub fn find_vlr_metadata<'a>(
    root: &'a MetadataNode,
    record_id: u16,
    user_id: &str,
) -> Option<&'a MetadataNode> {
    let record_id = record_id.to_string();
    root.find(|node| {
        starts_with_ignore_case(&node.name, "vlr")
            && node
                .find_child(|n| n.name == "record_id" && n.value == record_id)
                .is_some()
            && node
                .find_child(|n| n.name == "user_id" && n.value == user_id)
                .is_some()
    })
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
