use crate::node::NodeRef;

/// A reference field: the string id is authoritative, the target is a cache filled by the
/// resolution pass and by explicit linking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    id: String,
    target: Option<NodeRef>,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: None,
        }
    }

    pub(crate) fn resolved(id: impl Into<String>, target: NodeRef) -> Self {
        Self {
            id: id.into(),
            target: Some(target),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.target.is_none()
    }

    pub fn target(&self) -> Option<NodeRef> {
        self.target
    }

    /// Replaces the id and drops the cached target until the next resolution.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.target = None;
    }

    pub fn clear(&mut self) {
        self.id.clear();
        self.target = None;
    }

    pub(crate) fn point_to(&mut self, target: NodeRef, id: impl Into<String>) {
        self.id = id.into();
        self.target = Some(target);
    }

    /// Takes over the current id of the resolved target.
    pub(crate) fn sync_id(&mut self, id: &str) {
        if self.id != id {
            self.id = id.to_string();
        }
    }

    pub(crate) fn resolve(&mut self, target: Option<NodeRef>) {
        self.target = target;
    }

    pub(crate) fn refers_to(&self, node: NodeRef, id: Option<&str>) -> bool {
        if self.target == Some(node) {
            return true;
        }
        matches!(id, Some(id) if !id.is_empty() && self.id == id)
    }
}

/// Whitespace separated list of references, e.g. `authorizedRoleRefs="r1 r2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceList {
    references: Vec<Reference>,
}

impl ReferenceList {
    pub fn parse(raw: &str) -> Self {
        Self {
            references: raw.split_whitespace().map(Reference::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.references.iter().map(Reference::id).collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.references.iter().any(|reference| reference.id() == id)
    }

    pub fn push(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Reference> {
        self.references.iter_mut()
    }

    pub fn to_attribute(&self) -> String {
        self.ids().join(" ")
    }

    pub(crate) fn remove_matching(&mut self, node: NodeRef, id: Option<&str>) -> bool {
        let before = self.references.len();
        self.references
            .retain(|reference| !reference.refers_to(node, id));
        before != self.references.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_matches_by_target_or_id() {
        let mut reference = Reference::new("sentry_1");
        assert!(reference.refers_to(NodeRef(4), Some("sentry_1")));
        assert!(!reference.refers_to(NodeRef(4), Some("sentry_2")));
        assert!(!reference.refers_to(NodeRef(4), None));

        reference.point_to(NodeRef(9), "renamed");
        assert!(reference.refers_to(NodeRef(9), None));
        assert_eq!(reference.id(), "renamed");

        reference.set_id("other");
        assert!(reference.target().is_none());
        reference.clear();
        assert!(reference.is_empty());
    }

    #[test]
    fn reference_list_parses_and_removes_entries() {
        let mut list = ReferenceList::parse("  role_a role_b\trole_c ");
        assert_eq!(list.ids(), vec!["role_a", "role_b", "role_c"]);
        assert!(list.remove_matching(NodeRef(1), Some("role_b")));
        assert!(!list.remove_matching(NodeRef(1), Some("role_x")));
        assert_eq!(list.to_attribute(), "role_a role_c");
        assert_eq!(list.len(), 2);
        assert!(ReferenceList::parse("   ").is_empty());
    }
}
