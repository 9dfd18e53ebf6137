//! The layer tree. Layers hold pixels, folders hold other members.
//!
//! Members are addressed by [`MemberID`], which stays the same for the life of a member, including
//! across removal and re-insertion by undo/redo. Lookups go through an ID index rather than walking
//! the tree.

use crate::{blend::BlendMode, id::LocalID, raster::ChunkyImage};

pub type MemberID = LocalID<StructureMember>;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("member {0} not found")]
    MemberNotFound(MemberID),
    #[error("member {0} is not a layer")]
    NotALayer(MemberID),
    #[error("member {0} is not a folder")]
    NotAFolder(MemberID),
    #[error("member {0} has no mask")]
    NoMask(MemberID),
    #[error("member {0} already has a mask")]
    AlreadyMasked(MemberID),
    #[error("member {0} already exists")]
    AlreadyExists(MemberID),
    #[error("can't move a member into itself or its own children")]
    WouldCycle,
}

#[derive(Debug)]
pub enum MemberKind {
    Layer { image: ChunkyImage },
    Folder,
}

#[derive(Debug)]
pub struct StructureMember {
    id: MemberID,
    pub name: String,
    pub is_visible: bool,
    pub blend_mode: BlendMode,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    pub mask: Option<ChunkyImage>,
    pub mask_is_visible: bool,
    pub kind: MemberKind,
}
impl StructureMember {
    fn new(id: MemberID, name: String, kind: MemberKind) -> Self {
        Self {
            id,
            name,
            is_visible: true,
            blend_mode: BlendMode::default(),
            opacity: 1.0,
            mask: None,
            mask_is_visible: true,
            kind,
        }
    }
    #[must_use]
    pub fn new_layer(id: MemberID, name: String) -> Self {
        Self::new(
            id,
            name,
            MemberKind::Layer {
                image: ChunkyImage::new(),
            },
        )
    }
    #[must_use]
    pub fn new_folder(id: MemberID, name: String) -> Self {
        Self::new(id, name, MemberKind::Folder)
    }
    #[must_use]
    pub fn id(&self) -> MemberID {
        self.id
    }
    #[must_use]
    pub fn is_layer(&self) -> bool {
        matches!(self.kind, MemberKind::Layer { .. })
    }
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, MemberKind::Folder)
    }
    #[must_use]
    pub fn image(&self) -> Option<&ChunkyImage> {
        match &self.kind {
            MemberKind::Layer { image } => Some(image),
            MemberKind::Folder => None,
        }
    }
    pub fn image_mut(&mut self) -> Option<&mut ChunkyImage> {
        match &mut self.kind {
            MemberKind::Layer { image } => Some(image),
            MemberKind::Folder => None,
        }
    }
}

/// Where in the tree a member lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// The nth child of this folder, where first = 0.
    ///
    /// An index too large will be clamped to the last position.
    IndexIntoFolder(MemberID, usize),
    /// The nth child of the root, where first = 0.
    ///
    /// An index too large will be clamped to the last position.
    IndexIntoRoot(usize),
}
impl Location {
    #[must_use]
    pub fn parent(&self) -> Option<MemberID> {
        match self {
            Self::IndexIntoFolder(parent, _) => Some(*parent),
            Self::IndexIntoRoot(_) => None,
        }
    }
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::IndexIntoFolder(_, idx) | Self::IndexIntoRoot(idx) => *idx,
        }
    }
}

/// A member taken out of the tree along with all of its descendants.
#[derive(Debug)]
pub struct DetachedMember {
    pub member: StructureMember,
    pub children: Vec<DetachedMember>,
}
impl DetachedMember {
    /// This member and every descendant, parents first.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &StructureMember> + '_> {
        Box::new(std::iter::once(&self.member).chain(self.children.iter().flat_map(Self::iter)))
    }
}

struct Entry {
    node: id_tree::NodeId,
    member: StructureMember,
}

pub struct StructureTree {
    /// Shape of the tree. The root holds `None`, every other node its member's ID.
    tree: id_tree::Tree<Option<MemberID>>,
    entries: hashbrown::HashMap<MemberID, Entry>,
}
impl Default for StructureTree {
    fn default() -> Self {
        Self {
            tree: id_tree::TreeBuilder::new()
                .with_root(id_tree::Node::new(None))
                .build(),
            entries: hashbrown::HashMap::new(),
        }
    }
}
impl StructureTree {
    fn root(&self) -> &id_tree::NodeId {
        // Built with a root, which is never removed.
        self.tree.root_node_id().expect("structure tree has no root")
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn contains(&self, id: MemberID) -> bool {
        self.entries.contains_key(&id)
    }
    #[must_use]
    pub fn find_member(&self, id: MemberID) -> Option<&StructureMember> {
        self.entries.get(&id).map(|entry| &entry.member)
    }
    pub fn find_member_mut(&mut self, id: MemberID) -> Option<&mut StructureMember> {
        self.entries.get_mut(&id).map(|entry| &mut entry.member)
    }
    /// Find a member, failing if it doesn't exist.
    pub fn find_member_or_err(&self, id: MemberID) -> Result<&StructureMember, DocumentError> {
        self.find_member(id).ok_or(DocumentError::MemberNotFound(id))
    }
    pub fn find_member_or_err_mut(
        &mut self,
        id: MemberID,
    ) -> Result<&mut StructureMember, DocumentError> {
        self.find_member_mut(id)
            .ok_or(DocumentError::MemberNotFound(id))
    }
    /// Find a layer's image, failing if the member doesn't exist or isn't a layer.
    pub fn find_layer_or_err(&self, id: MemberID) -> Result<&ChunkyImage, DocumentError> {
        self.find_member_or_err(id)?
            .image()
            .ok_or(DocumentError::NotALayer(id))
    }
    pub fn find_layer_or_err_mut(
        &mut self,
        id: MemberID,
    ) -> Result<&mut ChunkyImage, DocumentError> {
        self.find_member_or_err_mut(id)?
            .image_mut()
            .ok_or(DocumentError::NotALayer(id))
    }
    fn node_of(&self, id: MemberID) -> Result<&id_tree::NodeId, DocumentError> {
        self.entries
            .get(&id)
            .map(|entry| &entry.node)
            .ok_or(DocumentError::MemberNotFound(id))
    }
    /// The folder containing this member, or `None` if it's at the root.
    pub fn find_parent(&self, id: MemberID) -> Result<Option<MemberID>, DocumentError> {
        let node = self.node_of(id)?;
        // Only the root lacks a parent, and it has no ID.
        let parent = self
            .tree
            .get(node)
            .expect("indexed node missing from tree")
            .parent()
            .expect("member node has no parent");
        Ok(*self
            .tree
            .get(parent)
            .expect("parent missing from tree")
            .data())
    }
    /// Position of this member among its siblings.
    pub fn index_in_parent(&self, id: MemberID) -> Result<usize, DocumentError> {
        let node = self.node_of(id)?;
        let parent = self
            .tree
            .get(node)
            .expect("indexed node missing from tree")
            .parent()
            .expect("member node has no parent");
        Ok(self
            .tree
            .children_ids(parent)
            .expect("parent missing from tree")
            .position(|child| child == node)
            .expect("member missing from its parent's children"))
    }
    /// The location that would put a member back exactly where it is now.
    pub fn location_of(&self, id: MemberID) -> Result<Location, DocumentError> {
        let index = self.index_in_parent(id)?;
        Ok(match self.find_parent(id)? {
            Some(parent) => Location::IndexIntoFolder(parent, index),
            None => Location::IndexIntoRoot(index),
        })
    }
    /// Chain of folders from the top level down to, and including, the member.
    pub fn find_member_path(&self, id: MemberID) -> Result<Vec<MemberID>, DocumentError> {
        let node = self.node_of(id)?;
        let mut path: Vec<MemberID> = self
            .tree
            .ancestor_ids(node)
            .expect("indexed node missing from tree")
            .filter_map(|ancestor| *self.tree.get(ancestor).ok()?.data())
            .collect();
        path.reverse();
        path.push(id);
        Ok(path)
    }
    /// Direct children of a folder, or of the root if `None`, in order.
    pub fn children_of(&self, parent: Option<MemberID>) -> Result<Vec<MemberID>, DocumentError> {
        let node = self.folder_node(parent)?;
        Ok(self
            .tree
            .children_ids(&node)
            .expect("folder node missing from tree")
            .filter_map(|child| *self.tree.get(child).ok()?.data())
            .collect())
    }
    /// Every member, parents before their children, siblings in order.
    pub fn iter(&self) -> impl Iterator<Item = &StructureMember> + '_ {
        self.tree
            .traverse_pre_order_ids(self.root())
            .expect("root missing from tree")
            .filter_map(|node| *self.tree.get(&node).ok()?.data())
            .filter_map(|id| self.find_member(id))
    }
    /// Resolve a parent for insertion. It must be the root or an existing folder.
    fn folder_node(&self, parent: Option<MemberID>) -> Result<id_tree::NodeId, DocumentError> {
        match parent {
            None => Ok(self.root().clone()),
            Some(id) => {
                let entry = self
                    .entries
                    .get(&id)
                    .ok_or(DocumentError::MemberNotFound(id))?;
                if entry.member.is_folder() {
                    Ok(entry.node.clone())
                } else {
                    Err(DocumentError::NotAFolder(id))
                }
            }
        }
    }
    /// Move an already parented node to the nth position among its siblings.
    fn make_nth_sibling(&mut self, node: &id_tree::NodeId, index: usize) {
        let parent = self
            .tree
            .get(node)
            .expect("node missing from tree")
            .parent()
            .expect("node has no parent")
            .clone();
        let siblings = self
            .tree
            .children_ids(&parent)
            .expect("parent missing from tree")
            .count();
        self.tree
            .make_nth_sibling(node, index.min(siblings - 1))
            .expect("node missing from tree");
    }
    /// Add a new member with no children.
    pub fn insert(
        &mut self,
        member: StructureMember,
        location: Location,
    ) -> Result<(), DocumentError> {
        self.insert_detached(
            DetachedMember {
                member,
                children: Vec::new(),
            },
            location,
        )
    }
    /// Put a detached member and all of its descendants into the tree.
    /// On error, the tree is unchanged.
    pub fn insert_detached(
        &mut self,
        detached: DetachedMember,
        location: Location,
    ) -> Result<(), DocumentError> {
        if let Some(existing) = detached.iter().find(|member| self.contains(member.id)) {
            return Err(DocumentError::AlreadyExists(existing.id));
        }
        let parent = self.folder_node(location.parent())?;
        let node = self.attach(detached, &parent);
        self.make_nth_sibling(&node, location.index());
        Ok(())
    }
    fn attach(&mut self, detached: DetachedMember, parent: &id_tree::NodeId) -> id_tree::NodeId {
        let DetachedMember { member, children } = detached;
        let id = member.id;
        let node = self
            .tree
            .insert(
                id_tree::Node::new(Some(id)),
                id_tree::InsertBehavior::UnderNode(parent),
            )
            .expect("parent missing from tree");
        self.entries.insert(
            id,
            Entry {
                node: node.clone(),
                member,
            },
        );
        for child in children {
            self.attach(child, &node);
        }
        node
    }
    /// Take a member and all of its descendants out of the tree.
    pub fn detach(&mut self, id: MemberID) -> Result<DetachedMember, DocumentError> {
        let node = self.node_of(id)?.clone();
        Ok(self.detach_node(node))
    }
    fn detach_node(&mut self, node: id_tree::NodeId) -> DetachedMember {
        let child_nodes: Vec<_> = self
            .tree
            .children_ids(&node)
            .expect("node missing from tree")
            .cloned()
            .collect();
        let children = child_nodes
            .into_iter()
            .map(|child| self.detach_node(child))
            .collect();
        // Children were removed above, nothing is dropped here.
        let removed = self
            .tree
            .remove_node(node, id_tree::RemoveBehavior::DropChildren)
            .expect("node missing from tree");
        let id = removed.data().expect("detached the root");
        let entry = self
            .entries
            .remove(&id)
            .expect("tree node missing from index");
        DetachedMember {
            member: entry.member,
            children,
        }
    }
    /// Deep copy a member and its descendants, out of the tree. Only committed pixels are copied.
    ///
    /// The copies get their IDs from `next_id`, parents first.
    pub fn duplicate(
        &self,
        id: MemberID,
        next_id: &mut dyn FnMut() -> MemberID,
    ) -> Result<DetachedMember, DocumentError> {
        let node = self.node_of(id)?;
        Ok(self.duplicate_node(node, next_id))
    }
    fn duplicate_node(
        &self,
        node: &id_tree::NodeId,
        next_id: &mut dyn FnMut() -> MemberID,
    ) -> DetachedMember {
        let id = self
            .tree
            .get(node)
            .expect("node missing from tree")
            .data()
            .expect("duplicated the root");
        let original = &self
            .entries
            .get(&id)
            .expect("tree node missing from index")
            .member;
        let member = StructureMember {
            id: next_id(),
            name: original.name.clone(),
            is_visible: original.is_visible,
            blend_mode: original.blend_mode,
            opacity: original.opacity,
            mask: original.mask.as_ref().map(ChunkyImage::clone_from_committed),
            mask_is_visible: original.mask_is_visible,
            kind: match &original.kind {
                MemberKind::Layer { image } => MemberKind::Layer {
                    image: image.clone_from_committed(),
                },
                MemberKind::Folder => MemberKind::Folder,
            },
        };
        let children = self
            .tree
            .children_ids(node)
            .expect("node missing from tree")
            .map(|child| self.duplicate_node(child, &mut *next_id))
            .collect();
        DetachedMember { member, children }
    }
    /// Move a member, with its descendants, to a new location.
    pub fn move_member(&mut self, id: MemberID, location: Location) -> Result<(), DocumentError> {
        let node = self.node_of(id)?.clone();
        let destination = self.folder_node(location.parent())?;
        // Are we trying to move into one of this member's own children, or itself?
        let would_cycle = std::iter::once(&destination)
            .chain(
                self.tree
                    .ancestor_ids(&destination)
                    .expect("folder node missing from tree"),
            )
            .any(|ancestor| *ancestor == node);
        if would_cycle {
            return Err(DocumentError::WouldCycle);
        }
        self.tree
            .move_node(&node, id_tree::MoveBehavior::ToParent(&destination))
            .expect("node missing from tree");
        self.make_nth_sibling(&node, location.index());
        Ok(())
    }
}
impl std::fmt::Debug for StructureTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|member| (member.id, &member.name)))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn layer(tree: &mut StructureTree, name: &str, location: Location) -> MemberID {
        let id = MemberID::default();
        tree.insert(StructureMember::new_layer(id, name.to_owned()), location)
            .unwrap();
        id
    }
    fn folder(tree: &mut StructureTree, name: &str, location: Location) -> MemberID {
        let id = MemberID::default();
        tree.insert(StructureMember::new_folder(id, name.to_owned()), location)
            .unwrap();
        id
    }

    #[test]
    fn insert_order_and_clamp() {
        let mut tree = StructureTree::default();
        let a = layer(&mut tree, "a", Location::IndexIntoRoot(0));
        let b = layer(&mut tree, "b", Location::IndexIntoRoot(0));
        let c = layer(&mut tree, "c", Location::IndexIntoRoot(100));
        assert_eq!(tree.children_of(None).unwrap(), vec![b, a, c]);
        assert_eq!(tree.index_in_parent(c).unwrap(), 2);
        assert_eq!(tree.location_of(a).unwrap(), Location::IndexIntoRoot(1));
    }
    #[test]
    fn nested_queries() {
        let mut tree = StructureTree::default();
        let outer = folder(&mut tree, "outer", Location::IndexIntoRoot(0));
        let inner = folder(&mut tree, "inner", Location::IndexIntoFolder(outer, 0));
        let leaf = layer(&mut tree, "leaf", Location::IndexIntoFolder(inner, 0));

        assert_eq!(tree.find_member_path(leaf).unwrap(), vec![outer, inner, leaf]);
        assert_eq!(tree.find_parent(leaf).unwrap(), Some(inner));
        assert_eq!(tree.find_parent(outer).unwrap(), None);
        assert!(tree.find_layer_or_err(leaf).is_ok());
        assert!(matches!(
            tree.find_layer_or_err(inner),
            Err(DocumentError::NotALayer(_))
        ));
        let order: Vec<_> = tree.iter().map(StructureMember::id).collect();
        assert_eq!(order, vec![outer, inner, leaf]);

        // Layers can't hold children.
        let err = tree
            .insert(
                StructureMember::new_layer(MemberID::default(), String::new()),
                Location::IndexIntoFolder(leaf, 0),
            )
            .unwrap_err();
        assert!(matches!(err, DocumentError::NotAFolder(_)));
    }
    #[test]
    fn detach_reinsert() {
        let mut tree = StructureTree::default();
        let first = layer(&mut tree, "first", Location::IndexIntoRoot(0));
        let group = folder(&mut tree, "group", Location::IndexIntoRoot(1));
        let child_a = layer(&mut tree, "a", Location::IndexIntoFolder(group, 0));
        let child_b = layer(&mut tree, "b", Location::IndexIntoFolder(group, 1));
        let last = layer(&mut tree, "last", Location::IndexIntoRoot(2));

        let location = tree.location_of(group).unwrap();
        let detached = tree.detach(group).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.find_member(child_a).is_none());
        assert_eq!(detached.iter().count(), 3);

        tree.insert_detached(detached, location).unwrap();
        assert_eq!(tree.children_of(None).unwrap(), vec![first, group, last]);
        assert_eq!(tree.children_of(Some(group)).unwrap(), vec![child_a, child_b]);
    }
    #[test]
    fn duplicate_rejected() {
        let mut tree = StructureTree::default();
        let a = layer(&mut tree, "a", Location::IndexIntoRoot(0));
        let err = tree
            .insert(StructureMember::new_folder(a, String::new()), Location::IndexIntoRoot(0))
            .unwrap_err();
        assert!(matches!(err, DocumentError::AlreadyExists(id) if id == a));
        assert_eq!(tree.len(), 1);
    }
    #[test]
    fn move_and_cycle() {
        let mut tree = StructureTree::default();
        let outer = folder(&mut tree, "outer", Location::IndexIntoRoot(0));
        let inner = folder(&mut tree, "inner", Location::IndexIntoFolder(outer, 0));
        let a = layer(&mut tree, "a", Location::IndexIntoRoot(1));

        assert!(matches!(
            tree.move_member(outer, Location::IndexIntoFolder(inner, 0)),
            Err(DocumentError::WouldCycle)
        ));
        assert!(matches!(
            tree.move_member(outer, Location::IndexIntoFolder(outer, 0)),
            Err(DocumentError::WouldCycle)
        ));

        tree.move_member(a, Location::IndexIntoFolder(inner, 0)).unwrap();
        assert_eq!(tree.find_member_path(a).unwrap(), vec![outer, inner, a]);
        tree.move_member(a, Location::IndexIntoRoot(0)).unwrap();
        assert_eq!(tree.children_of(None).unwrap(), vec![a, outer]);
    }
}
