//! Trees of methods overriding each other, as needed to find all methods sharing a name.

use duke::entry::{Entry, MethodEntry};
use quill::resolver::{EntryResolver, ResolutionStrategy};
use crate::resolver::IndexEntryResolver;

/// A method and the methods overriding it in the subclasses.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInheritanceTreeNode {
	pub entry: MethodEntry,
	/// Whether the class of this node declares the method itself, or just inherits it.
	pub implemented: bool,
	pub children: Vec<MethodInheritanceTreeNode>,
}

/// A method and the classes below it that declare it again.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodImplementationsTreeNode {
	pub entry: MethodEntry,
	pub children: Vec<MethodImplementationsTreeNode>,
}

impl MethodInheritanceTreeNode {
	/// All methods in this tree, in depth first order.
	pub fn methods(&self) -> Vec<&MethodEntry> {
		let mut methods = vec![&self.entry];
		for child in &self.children {
			methods.extend(child.methods());
		}
		methods
	}
}

#[derive(Debug, Copy, Clone)]
pub struct IndexTreeBuilder<'a> {
	resolver: IndexEntryResolver<'a>,
}

impl<'a> IndexTreeBuilder<'a> {
	pub fn new(resolver: IndexEntryResolver<'a>) -> IndexTreeBuilder<'a> {
		IndexTreeBuilder { resolver }
	}

	/// Builds the tree starting at the topmost declaration of the method.
	///
	/// A subclass gets a node if it declares the method, or if one of its own subclasses does.
	pub fn build_method_inheritance(&self, method: &MethodEntry) -> MethodInheritanceTreeNode {
		let root = match self.resolver.resolve_first_entry(&Entry::Method(method.clone()), ResolutionStrategy::ResolveRoot) {
			Entry::Method(root) => root,
			_ => method.clone(),
		};

		let mut node = MethodInheritanceTreeNode {
			implemented: self.resolver.entry_index().has_method(&root),
			entry: root,
			children: Vec::new(),
		};
		self.load_inheritance(&mut node);
		node
	}

	/// Returns whether any child was added.
	fn load_inheritance(&self, node: &mut MethodInheritanceTreeNode) -> bool {
		for inheritor in self.resolver.inheritance_index().get_children(&node.entry.parent) {
			let entry = node.entry.with_parent(inheritor.clone());
			let mut child = MethodInheritanceTreeNode {
				implemented: self.resolver.entry_index().has_method(&entry),
				entry,
				children: Vec::new(),
			};

			let has_children = self.load_inheritance(&mut child);
			if child.implemented || has_children {
				node.children.push(child);
			}
		}

		!node.children.is_empty()
	}

	/// For each topmost declaration of the method, the declarations of it in descendants of that class.
	pub fn build_method_implementations(&self, method: &MethodEntry) -> Vec<MethodImplementationsTreeNode> {
		self.resolver.resolve_entry(&Entry::Method(method.clone()), ResolutionStrategy::ResolveRoot)
			.into_iter()
			.filter_map(|entry| match entry {
				Entry::Method(root) => Some(root),
				_ => None,
			})
			.map(|root| {
				let children = self.resolver.inheritance_index().get_descendants(&root.parent)
					.into_iter()
					.map(|descendant| root.with_parent(descendant))
					.filter(|implementation| self.resolver.entry_index().has_method(implementation))
					.map(|entry| MethodImplementationsTreeNode { entry, children: Vec::new() })
					.collect();

				MethodImplementationsTreeNode { entry: root, children }
			})
			.collect()
	}
}
