use indexmap::{IndexMap, IndexSet};
use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Dfs;
use duke::access::AccessFlags;
use duke::entry::{ClassEntry, Entry};
use quill::translator::{Translatable, Translator};
use crate::index::entry::EntryIndex;
use crate::index::inheritance::InheritanceIndex;
use crate::index::reference::{EntryReference, ReferenceIndex, ReferenceTargetType};

/// Groups the classes that have to stay in the same package, because one of them uses something package private or
/// protected of another.
#[derive(Debug, Clone, Default)]
pub struct PackageVisibilityIndex {
	partitions: Vec<IndexSet<ClassEntry>>,
	class_partitions: IndexMap<ClassEntry, usize>,
}

/// Returns whether the reference only works if both classes are in the same package.
fn requires_same_package<E, C>(access: AccessFlags, reference: &EntryReference<E, C>, inheritance_index: &InheritanceIndex) -> bool
where
	E: Into<Entry> + Clone,
	C: Into<Entry> + Clone,
{
	if access.is_public() {
		return false;
	}

	if access.is_protected() {
		let context: Entry = reference.context.clone().into();
		let referenced: Entry = reference.entry.clone().into();
		let context_class = context.containing_class();
		let referenced_class = referenced.containing_class();

		if !inheritance_index.get_ancestors(context_class).contains(referenced_class) {
			// protected member of a class that isn't a superclass
			return true;
		}

		return match &reference.target_type {
			// static member, or member of the superclass itself
			ReferenceTargetType::None => false,
			ReferenceTargetType::Uninitialized => false,
			// instance members are only accessible on instances of the context class
			ReferenceTargetType::ClassType(target) => {
				target != context_class && !inheritance_index.get_ancestors(target).contains(context_class)
			},
		};
	}

	true
}

struct Connections {
	graph: UnGraph<ClassEntry, ()>,
	nodes: IndexMap<ClassEntry, NodeIndex>,
	/// The indexed classes are the first nodes, the ones after only connect them, like an outer class not in the jar.
	indexed: usize,
}

impl Connections {
	fn new<'a>(classes: impl Iterator<Item=&'a ClassEntry>) -> Connections {
		let mut graph = UnGraph::new_undirected();
		let nodes: IndexMap<_, _> = classes
			.map(|class| (class.clone(), graph.add_node(class.clone())))
			.collect();
		let indexed = nodes.len();
		Connections { graph, nodes, indexed }
	}

	fn is_indexed(&self, node: NodeIndex) -> bool {
		node.index() < self.indexed
	}

	fn node(&mut self, class: &ClassEntry) -> NodeIndex {
		if let Some(&node) = self.nodes.get(class) {
			node
		} else {
			let node = self.graph.add_node(class.clone());
			self.nodes.insert(class.clone(), node);
			node
		}
	}

	fn connect(&mut self, a: &ClassEntry, b: &ClassEntry) {
		if a != b {
			let a = self.node(a);
			let b = self.node(b);
			self.graph.update_edge(a, b, ());
		}
	}

	fn connect_references<E, C>(&mut self, access: AccessFlags, references: &[EntryReference<E, C>], inheritance_index: &InheritanceIndex)
	where
		E: Into<Entry> + Clone,
		C: Into<Entry> + Clone,
	{
		for reference in references {
			if requires_same_package(access, reference, inheritance_index) {
				let referenced: Entry = reference.entry.clone().into();
				let context: Entry = reference.context.clone().into();
				self.connect(referenced.containing_class(), context.containing_class());
			}
		}
	}
}

impl PackageVisibilityIndex {
	pub fn new() -> PackageVisibilityIndex {
		PackageVisibilityIndex::default()
	}

	pub(crate) fn build(entry_index: &EntryIndex, inheritance_index: &InheritanceIndex, reference_index: &ReferenceIndex) -> PackageVisibilityIndex {
		let connections = Self::connections(entry_index, inheritance_index, reference_index);
		let index = Self::partitions(connections);
		debug!("partitioned {} classes into {} groups sharing a package", index.class_partitions.len(), index.partitions.len());
		index
	}

	fn connections(entry_index: &EntryIndex, inheritance_index: &InheritanceIndex, reference_index: &ReferenceIndex) -> Connections {
		let mut connections = Connections::new(entry_index.classes());

		let is_package_or_protected = |access: &AccessFlags| !access.is_public() && !access.is_private();

		for field in entry_index.fields() {
			if let Some(access) = entry_index.get_field_access(field).filter(is_package_or_protected) {
				connections.connect_references(access, reference_index.get_references_to_field(field), inheritance_index);
			}
		}

		for method in entry_index.methods() {
			if let Some(access) = entry_index.get_method_access(method).filter(is_package_or_protected) {
				connections.connect_references(access, reference_index.get_references_to_method(method), inheritance_index);
			}
		}

		for class in entry_index.classes() {
			if let Some(access) = entry_index.get_class_access(class).filter(is_package_or_protected) {
				connections.connect_references(access, reference_index.get_field_type_references_to_class(class), inheritance_index);
				connections.connect_references(access, reference_index.get_method_type_references_to_class(class), inheritance_index);
			}

			for parent in inheritance_index.get_parents(class) {
				if entry_index.get_class_access(parent).is_some_and(|access| is_package_or_protected(&access)) {
					connections.connect(class, parent);
				}
			}

			if let Some(outer) = class.outer() {
				connections.connect(class, outer);
			}
		}

		connections
	}

	/// The connected components of the graph, each found by a depth first flood fill. Classes that aren't indexed
	/// still connect others, but aren't part of any partition.
	fn partitions(connections: Connections) -> PackageVisibilityIndex {
		let graph = &connections.graph;
		let mut index = PackageVisibilityIndex::new();

		for start in graph.node_indices().filter(|&node| connections.is_indexed(node)) {
			if index.class_partitions.contains_key(&graph[start]) {
				continue;
			}

			let mut partition = IndexSet::new();
			let mut dfs = Dfs::new(graph, start);
			while let Some(node) = dfs.next(graph) {
				if connections.is_indexed(node) {
					partition.insert(graph[node].clone());
				}
			}

			let partition_index = index.partitions.len();
			for class in &partition {
				index.class_partitions.insert(class.clone(), partition_index);
			}
			index.partitions.push(partition);
		}

		index
	}

	pub fn get_partitions(&self) -> &[IndexSet<ClassEntry>] {
		&self.partitions
	}

	/// The classes that need to be in the same package as the given one, including itself.
	pub fn get_partition(&self, class: &ClassEntry) -> Option<&IndexSet<ClassEntry>> {
		self.class_partitions.get(class)
			.and_then(|&index| self.partitions.get(index))
	}

	pub fn remapped(&self, translator: &(impl Translator + ?Sized)) -> PackageVisibilityIndex {
		PackageVisibilityIndex {
			partitions: self.partitions.iter()
				.map(|partition| partition.iter().map(|class| class.translate(translator)).collect())
				.collect(),
			class_partitions: self.class_partitions.iter()
				.map(|(class, &index)| (class.translate(translator), index))
				.collect(),
		}
	}
}
