//! Realm table
//!
//! Every realm of one isolation boundary: the top realm and the realms
//! nested under it through frames.

use frameguard_dom::Document;

use crate::Realm;

/// Realm identifier (index into the table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RealmId(pub(crate) u32);

impl RealmId {
    /// The top realm of every table
    pub const TOP: RealmId = RealmId(0);

    pub const fn new(index: u32) -> Self {
        RealmId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// All realms of one boundary
#[derive(Debug)]
pub struct RealmTable {
    realms: Vec<Realm>,
}

impl RealmTable {
    /// A table holding only the top realm
    pub fn new(top_document: Document) -> Self {
        Self {
            realms: vec![Realm::top(top_document)],
        }
    }

    #[inline]
    pub fn top(&self) -> RealmId {
        RealmId::TOP
    }

    /// Create a realm nested under `parent`. `None` if `parent` is unknown.
    pub fn create_nested(&mut self, parent: RealmId, document: Document) -> Option<RealmId> {
        self.get(parent)?;
        let id = RealmId(self.realms.len() as u32);
        self.realms.push(Realm::new(id, Some(parent), document));
        tracing::debug!(realm = id.0, parent = parent.0, "nested realm created");
        Some(id)
    }

    pub fn get(&self, id: RealmId) -> Option<&Realm> {
        self.realms.get(id.index())
    }

    pub fn get_mut(&mut self, id: RealmId) -> Option<&mut Realm> {
        self.realms.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.realms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realms.is_empty()
    }

    /// Number of frame hops between `id` and the top realm
    pub fn depth(&self, id: RealmId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent() {
            current = self.get(parent)?;
            depth += 1;
        }
        Some(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_realms() {
        let mut table = RealmTable::new(Document::default());
        let child = table.create_nested(table.top(), Document::default()).unwrap();
        let grandchild = table.create_nested(child, Document::default()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.get(table.top()).unwrap().is_top());
        assert!(!table.get(child).unwrap().is_top());
        assert_eq!(table.get(grandchild).unwrap().parent(), Some(child));
        assert_eq!(table.depth(grandchild), Some(2));
    }

    #[test]
    fn test_unknown_parent() {
        let mut table = RealmTable::new(Document::default());
        assert!(table.create_nested(RealmId(9), Document::default()).is_none());
        assert!(table.get(RealmId(9)).is_none());
    }
}
