//! Resolving entries with the knowledge of a [`JarIndex`][crate::index::JarIndex].

use indexmap::IndexSet;
use log::{trace, warn};
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry, MethodEntry};
use quill::resolver::{EntryResolver, ResolutionStrategy};
use crate::index::bridge::BridgeMethodIndex;
use crate::index::entry::EntryIndex;
use crate::index::inheritance::InheritanceIndex;
use crate::tree_builder::{IndexTreeBuilder, MethodImplementationsTreeNode, MethodInheritanceTreeNode};

/// An [`EntryResolver`] looking at the declarations, the class hierarchy and the bridge methods of an index.
#[derive(Debug, Copy, Clone)]
pub struct IndexEntryResolver<'a> {
	entry_index: &'a EntryIndex,
	inheritance_index: &'a InheritanceIndex,
	bridge_method_index: &'a BridgeMethodIndex,
}

/// Returns whether a method can be overridden, and so shares its name with other methods.
fn can_inherit(method: &MethodEntry, access: AccessFlags) -> bool {
	!method.is_constructor() && !access.is_private() && !access.is_static() && !access.is_final()
}

/// The field or method that is (or contains) the given entry. Classes are not members of anything.
fn class_child(entry: &Entry) -> Option<Entry> {
	match entry {
		Entry::Class(_) => None,
		Entry::Field(_) | Entry::Method(_) => Some(entry.clone()),
		Entry::LocalVariable(local) => Some(Entry::Method(local.parent.clone())),
	}
}

/// The same member, but in another class.
fn with_owner(member: &Entry, owner: &ClassEntry) -> Entry {
	match member {
		Entry::Field(field) => Entry::Field(field.with_parent(owner.clone())),
		Entry::Method(method) => Entry::Method(method.with_parent(owner.clone())),
		other => other.clone(),
	}
}

impl<'a> IndexEntryResolver<'a> {
	pub fn new(
		entry_index: &'a EntryIndex,
		inheritance_index: &'a InheritanceIndex,
		bridge_method_index: &'a BridgeMethodIndex,
	) -> IndexEntryResolver<'a> {
		IndexEntryResolver { entry_index, inheritance_index, bridge_method_index }
	}

	pub fn tree_builder(&self) -> IndexTreeBuilder<'a> {
		IndexTreeBuilder::new(*self)
	}

	pub(crate) fn entry_index(&self) -> &'a EntryIndex {
		self.entry_index
	}

	pub(crate) fn inheritance_index(&self) -> &'a InheritanceIndex {
		self.inheritance_index
	}

	/// The class that declares the member, as seen from the member's own class.
	///
	/// Private and static members can't be inherited and are always owned by their own class. Otherwise the nearest
	/// class up the hierarchy declaring the member is the owner.
	pub fn resolve_entry_owner(&self, member: &Entry) -> ClassEntry {
		let own_class = member.containing_class();

		let access = self.entry_index.get_entry_access(member);
		if access.is_some_and(|access| access.is_private() || access.is_static()) {
			return own_class.clone();
		}

		self.resolve_first_entry(member, ResolutionStrategy::ResolveClosest)
			.containing_class()
			.clone()
	}

	fn resolve_child_entry(&self, member: &Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
		let owner = member.containing_class();

		if let Entry::Method(method) = member {
			if let Some(bridge) = self.bridge_method_index.get_bridge_from_specialized(method) {
				if &bridge.parent == owner && bridge != method {
					trace!("resolving specialized method {method} through its bridge {bridge}");
					let bridge = Entry::Method(bridge.clone());
					let resolved = self.resolve_child_entry(&bridge, strategy);
					return if resolved.is_empty() { vec![bridge] } else { resolved };
				}
			}
		}

		let mut resolved = IndexSet::new();
		for parent in self.inheritance_index.get_parents(owner) {
			let parent_member = with_owner(member, parent);
			match strategy {
				ResolutionStrategy::ResolveRoot => resolved.extend(self.resolve_root(parent_member, strategy)),
				ResolutionStrategy::ResolveClosest => resolved.extend(self.resolve_closest(parent_member, strategy)),
			}
		}
		resolved.into_iter().collect()
	}

	/// Looks for the topmost declaration first, and only takes this one if there's none further up.
	fn resolve_root(&self, member: Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
		let resolved = self.resolve_child_entry(&member, strategy);
		if resolved.is_empty() && self.is_declared_non_private(&member) {
			vec![member]
		} else {
			resolved
		}
	}

	/// Takes this declaration if there is one, and only looks further up otherwise.
	fn resolve_closest(&self, member: Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
		if self.is_declared_non_private(&member) {
			vec![member]
		} else {
			self.resolve_child_entry(&member, strategy)
		}
	}

	fn is_declared_non_private(&self, member: &Entry) -> bool {
		self.entry_index.get_entry_access(member).is_some_and(|access| !access.is_private())
	}

	fn collect_inheritance_node(&self, methods: &mut IndexSet<MethodEntry>, visited: &mut IndexSet<MethodEntry>, node: &MethodInheritanceTreeNode) {
		if !visited.insert(node.entry.clone()) {
			return;
		}

		if self.entry_index.get_method_access(&node.entry).is_some_and(|access| can_inherit(&node.entry, access)) {
			methods.insert(node.entry.clone());
		}

		self.follow_bridges(methods, visited, &node.entry);

		for implementations in self.tree_builder().build_method_implementations(&node.entry) {
			self.collect_implementations_node(methods, visited, &implementations);
		}

		for child in &node.children {
			self.collect_inheritance_node(methods, visited, child);
		}
	}

	fn collect_implementations_node(&self, methods: &mut IndexSet<MethodEntry>, visited: &mut IndexSet<MethodEntry>, node: &MethodImplementationsTreeNode) {
		if self.entry_index.get_method_access(&node.entry).is_some_and(|access| !access.is_private() && !access.is_static()) {
			methods.insert(node.entry.clone());
		}

		self.follow_bridges(methods, visited, &node.entry);

		for child in &node.children {
			self.collect_implementations_node(methods, visited, child);
		}
	}

	/// Bridge and specialized method share their name, so both directions of the bridge are followed.
	fn follow_bridges(&self, methods: &mut IndexSet<MethodEntry>, visited: &mut IndexSet<MethodEntry>, method: &MethodEntry) {
		let bridges = self.bridge_method_index.get_bridge_from_specialized(method);
		let specialized = self.bridge_method_index.get_bridged_method(method);

		for other in bridges.into_iter().chain(specialized) {
			// the tree of a specialized method starts at its bridge, so the method itself is collected here
			if self.entry_index.get_method_access(other).is_some_and(|access| can_inherit(other, access)) {
				methods.insert(other.clone());
			}

			let tree = self.tree_builder().build_method_inheritance(other);
			self.collect_inheritance_node(methods, visited, &tree);
		}
	}
}

impl EntryResolver for IndexEntryResolver<'_> {
	fn resolve_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
		let Some(child) = class_child(entry) else {
			return vec![entry.clone()];
		};

		let access = self.entry_index.get_entry_access(&child);
		if strategy == ResolutionStrategy::ResolveClosest && access.is_some() {
			return vec![entry.clone()];
		}

		if !access.is_some_and(|access| access.is_private()) {
			let resolved = self.resolve_child_entry(&child, strategy);
			if !resolved.is_empty() {
				return resolved.iter()
					.map(|resolved_child| entry.replace_ancestor(&child, resolved_child))
					.collect();
			}
		}

		vec![entry.clone()]
	}

	fn resolve_equivalent_methods(&self, method: &MethodEntry) -> IndexSet<MethodEntry> {
		let Some(access) = self.entry_index.get_method_access(method) else {
			warn!("cannot find equivalent methods of unknown method {method}");
			return IndexSet::from([method.clone()]);
		};

		if !can_inherit(method, access) {
			return IndexSet::from([method.clone()]);
		}

		let mut methods = IndexSet::new();
		let mut visited = IndexSet::new();
		let tree = self.tree_builder().build_method_inheritance(method);
		self.collect_inheritance_node(&mut methods, &mut visited, &tree);

		methods.insert(method.clone());
		methods
	}
}
