//! The tree of mappings, mirroring how entries contain each other: classes contain their members and inner classes,
//! methods contain their local variables.
//!
//! Nodes live in an arena and are addressed by a [`NodeId`]. A separate map from [`Entry`] to [`NodeId`] gives the
//! lookup by identity, so that moving a subtree to a new ancestor only rewrites the lookup keys.

mod delta;

use anyhow::{anyhow, bail, Result};
use indexmap::{IndexMap, IndexSet};
use duke::entry::Entry;
use crate::translator::Translator;

pub use delta::{DeltaTrackingTree, MappingDelta};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<V> {
	entry: Entry,
	value: Option<V>,
	parent: Option<NodeId>,
	children: IndexSet<NodeId>,
}

/// A map from [`Entry`] to `V`, organized as a tree along the containment of entries.
///
/// Inserting a value for an entry creates (empty) nodes for all of its ancestors. Nodes without a value and without
/// children are removed again, so the tree never holds dead branches.
///
/// Slots of removed nodes are never reused, so a stale [`NodeId`] simply reads as absent.
#[derive(Debug, Clone)]
pub struct EntryTree<V> {
	nodes: Vec<Option<Node<V>>>,
	ids: IndexMap<Entry, NodeId>,
	roots: IndexSet<NodeId>,
}

impl<V> Default for EntryTree<V> {
	fn default() -> Self {
		EntryTree {
			nodes: Vec::new(),
			ids: IndexMap::new(),
			roots: IndexSet::new(),
		}
	}
}

impl<V> EntryTree<V> {
	pub fn new() -> EntryTree<V> {
		EntryTree::default()
	}

	fn node(&self, id: NodeId) -> Option<&Node<V>> {
		self.nodes.get(id.0).and_then(Option::as_ref)
	}

	fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<V>> {
		self.nodes.get_mut(id.0).and_then(Option::as_mut)
	}

	fn node_ref(&self, id: NodeId) -> Option<NodeRef<'_, V>> {
		self.node(id).map(|node| NodeRef { tree: self, id, node })
	}

	/// Sets the value of `entry`, returning the old one. Inserting `None` is the same as removing.
	pub fn insert(&mut self, entry: Entry, value: Option<V>) -> Option<V> {
		let clears = value.is_none();
		let id = self.make_path(&entry);
		let old = self.node_mut(id).and_then(|node| std::mem::replace(&mut node.value, value));

		if clears {
			self.remove_dead_along(id);
		}

		old
	}

	pub fn remove(&mut self, entry: &Entry) -> Option<V> {
		let id = *self.ids.get(entry)?;
		let old = self.node_mut(id).and_then(|node| node.value.take());
		self.remove_dead_along(id);
		old
	}

	pub fn get(&self, entry: &Entry) -> Option<&V> {
		self.ids.get(entry)
			.and_then(|&id| self.node(id))
			.and_then(|node| node.value.as_ref())
	}

	pub fn get_mut(&mut self, entry: &Entry) -> Option<&mut V> {
		let id = *self.ids.get(entry)?;
		self.node_mut(id).and_then(|node| node.value.as_mut())
	}

	/// Returns whether there's a value for `entry`. A node that only exists because of its children doesn't count.
	pub fn contains(&self, entry: &Entry) -> bool {
		self.get(entry).is_some()
	}

	pub fn find_node(&self, entry: &Entry) -> Option<NodeRef<'_, V>> {
		self.ids.get(entry).and_then(|&id| self.node_ref(id))
	}

	pub fn children(&self, entry: &Entry) -> Vec<&Entry> {
		self.find_node(entry)
			.map(|node| node.children().map(|child| child.entry()).collect())
			.unwrap_or_default()
	}

	/// The entries sharing the parent of `entry`, excluding `entry` itself.
	///
	/// Works for entries that aren't in the tree too.
	pub fn siblings(&self, entry: &Entry) -> Vec<&Entry> {
		let generation = match entry.parent() {
			Some(parent) => self.children(&parent),
			None => self.root_entries().collect(),
		};

		generation.into_iter()
			.filter(|sibling| *sibling != entry)
			.collect()
	}

	pub fn root_nodes(&self) -> impl Iterator<Item=NodeRef<'_, V>> {
		self.roots.iter().filter_map(|&id| self.node_ref(id))
	}

	pub fn root_entries(&self) -> impl Iterator<Item=&Entry> {
		self.root_nodes().map(|node| node.entry())
	}

	/// All nodes, parents before their children.
	pub fn nodes(&self) -> Vec<NodeRef<'_, V>> {
		let mut nodes = Vec::with_capacity(self.ids.len());
		for root in self.root_nodes() {
			root.collect_recursively(&mut nodes);
		}
		nodes
	}

	/// All entries having a value, parents before their children.
	pub fn all_entries(&self) -> impl Iterator<Item=&Entry> {
		self.iter().map(|(entry, _)| entry)
	}

	/// All entries with their values, parents before their children.
	pub fn iter(&self) -> impl Iterator<Item=(&Entry, &V)> {
		self.nodes().into_iter()
			.filter_map(|node| node.value().map(|value| (node.entry(), value)))
	}

	/// The number of entries with a value.
	pub fn len(&self) -> usize {
		self.nodes.iter()
			.flatten()
			.filter(|node| node.value.is_some())
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}

	/// Moves the node of `from` (with its whole subtree) to `to`, re-keying every descendant to the new ancestry.
	///
	/// Fails if `to` or one of the new descendant keys is already taken by a node outside the moved subtree, or if
	/// `to` would end up inside its own subtree. The tree is unchanged on failure.
	pub fn relocate(&mut self, from: &Entry, to: Entry) -> Result<()> {
		let id = *self.ids.get(from)
			.ok_or_else(|| anyhow!("cannot relocate {from}: it's not in the tree"))?;

		if from != &to && to.has_ancestor(from) {
			bail!("cannot relocate {from} into itself as {to}");
		}

		let mut subtree = Vec::new();
		if let Some(node) = self.node_ref(id) {
			node.collect_recursively(&mut subtree);
		}
		let subtree: IndexSet<NodeId> = subtree.into_iter().map(|node| node.id).collect();

		let mut moves = Vec::with_capacity(subtree.len());
		for &node_id in &subtree {
			let Some(node) = self.node(node_id) else { continue };
			let new_entry = node.entry.replace_ancestor(from, &to);

			if let Some(other) = self.ids.get(&new_entry) {
				if !subtree.contains(other) {
					bail!("cannot relocate {from} to {to}: {new_entry} is already in the tree");
				}
			}
			moves.push((node_id, new_entry));
		}

		for (node_id, _) in &moves {
			if let Some(old_entry) = self.node(*node_id).map(|node| node.entry.clone()) {
				self.ids.swap_remove(&old_entry);
			}
		}
		for (node_id, new_entry) in moves {
			if let Some(node) = self.node_mut(node_id) {
				node.entry = new_entry.clone();
			}
			self.ids.insert(new_entry, node_id);
		}

		let old_parent = self.node(id).and_then(|node| node.parent);
		let new_parent = to.parent().map(|parent| self.make_path(&parent));
		if old_parent != new_parent {
			self.detach(id, old_parent);
			self.attach(id, new_parent);
			if let Some(old_parent) = old_parent {
				self.remove_dead_along(old_parent);
			}
		}

		Ok(())
	}

	/// Creates a new tree with every entry passed through the translator, keeping the values.
	pub fn translate(&self, translator: &(impl Translator + ?Sized)) -> EntryTree<V>
	where
		V: Clone,
	{
		let mut tree = EntryTree::new();
		for (entry, value) in self.iter() {
			tree.insert(translator.translate_entry(entry), Some(value.clone()));
		}
		tree
	}

	/// Returns the node for `entry`, creating it and all its ancestors if needed.
	fn make_path(&mut self, entry: &Entry) -> NodeId {
		if let Some(&id) = self.ids.get(entry) {
			return id;
		}

		let parent = entry.parent().map(|parent| self.make_path(&parent));

		let id = NodeId(self.nodes.len());
		self.nodes.push(Some(Node {
			entry: entry.clone(),
			value: None,
			parent: None,
			children: IndexSet::new(),
		}));
		self.ids.insert(entry.clone(), id);
		self.attach(id, parent);

		id
	}

	fn attach(&mut self, id: NodeId, parent: Option<NodeId>) {
		match parent {
			Some(parent) => {
				if let Some(parent_node) = self.node_mut(parent) {
					parent_node.children.insert(id);
				}
			},
			None => {
				self.roots.insert(id);
			},
		}
		if let Some(node) = self.node_mut(id) {
			node.parent = parent;
		}
	}

	fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
		match parent {
			Some(parent) => {
				if let Some(parent_node) = self.node_mut(parent) {
					parent_node.children.shift_remove(&id);
				}
			},
			None => {
				self.roots.shift_remove(&id);
			},
		}
	}

	/// Removes nodes without a value and without children, going up from `id` as long as nodes become dead.
	fn remove_dead_along(&mut self, mut id: NodeId) {
		while let Some(node) = self.node(id) {
			if node.value.is_some() || !node.children.is_empty() {
				break;
			}

			let parent = node.parent;
			self.detach(id, parent);
			if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
				self.ids.swap_remove(&node.entry);
			}

			match parent {
				Some(parent) => id = parent,
				None => break,
			}
		}
	}
}

impl<V: PartialEq> PartialEq for EntryTree<V> {
	/// Two trees are equal if they have the same values for the same entries.
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(entry, value)| other.get(entry) == Some(value))
	}
}

impl<V> FromIterator<(Entry, V)> for EntryTree<V> {
	fn from_iter<T: IntoIterator<Item=(Entry, V)>>(iter: T) -> Self {
		let mut tree = EntryTree::new();
		for (entry, value) in iter {
			tree.insert(entry, Some(value));
		}
		tree
	}
}

/// A view of a single node of an [`EntryTree`].
pub struct NodeRef<'a, V> {
	tree: &'a EntryTree<V>,
	id: NodeId,
	node: &'a Node<V>,
}

impl<V> Clone for NodeRef<'_, V> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> NodeRef<'a, V> {
	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn entry(&self) -> &'a Entry {
		&self.node.entry
	}

	pub fn value(&self) -> Option<&'a V> {
		self.node.value.as_ref()
	}

	pub fn has_value(&self) -> bool {
		self.node.value.is_some()
	}

	pub fn parent(&self) -> Option<NodeRef<'a, V>> {
		self.node.parent.and_then(|id| self.tree.node_ref(id))
	}

	pub fn children(&self) -> impl Iterator<Item=NodeRef<'a, V>> + 'a {
		let tree = self.tree;
		self.node.children.iter().filter_map(move |&id| tree.node_ref(id))
	}

	pub fn has_children(&self) -> bool {
		!self.node.children.is_empty()
	}

	/// This node and all nodes below it, parents before their children.
	pub fn nodes_recursively(&self) -> Vec<NodeRef<'a, V>> {
		let mut nodes = Vec::new();
		self.collect_recursively(&mut nodes);
		nodes
	}

	fn collect_recursively(&self, nodes: &mut Vec<NodeRef<'a, V>>) {
		nodes.push(*self);
		for child in self.children() {
			child.collect_recursively(nodes);
		}
	}
}
