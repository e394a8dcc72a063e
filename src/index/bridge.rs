use anyhow::Result;
use indexmap::IndexMap;
use log::{debug, warn};
use duke::access::AccessFlags;
use duke::descriptor::Type;
use duke::entry::{ClassEntry, MethodEntry};
use quill::translator::{Translatable, Translator};
use crate::index::entry::EntryIndex;
use crate::index::inheritance::{InheritanceIndex, Relation};
use crate::index::reference::ReferenceIndex;

/// Knows about the bridge methods the compiler adds for generics and covariant return types.
///
/// A bridge method is a synthetic method calling exactly one other method, the specialized method. That heuristic
/// is intentionally permissive: a synthetic method making exactly one call for an unrelated reason is taken as a
/// bridge too, as long as it's flagged as one or its descriptor fits.
#[derive(Debug, Clone, Default)]
pub struct BridgeMethodIndex {
	bridge_to_specialized: IndexMap<MethodEntry, MethodEntry>,
	specialized_to_bridge: IndexMap<MethodEntry, MethodEntry>,
}

impl BridgeMethodIndex {
	pub fn new() -> BridgeMethodIndex {
		BridgeMethodIndex::default()
	}

	pub(crate) fn find_bridge_methods(entry_index: &EntryIndex, inheritance_index: &InheritanceIndex, reference_index: &ReferenceIndex) -> BridgeMethodIndex {
		let mut index = BridgeMethodIndex::new();

		for method in entry_index.methods() {
			let Some(access) = entry_index.get_method_access(method).filter(|access| access.is_synthetic()) else {
				continue;
			};

			let mut referenced = reference_index.get_methods_referenced_by(method);
			let (Some(specialized), None) = (referenced.next(), referenced.next()) else {
				continue;
			};

			let is_bridge = access.is_bridge() || is_potential_bridge(entry_index, inheritance_index, method, access, specialized)
				.unwrap_or_else(|e| {
					warn!("not treating {method} as bridge to {specialized}: {e:#}");
					false
				});

			if is_bridge {
				index.add(inheritance_index, method, specialized);
			}
		}

		debug!("found {} bridge methods", index.bridge_to_specialized.len());
		index
	}

	fn add(&mut self, inheritance_index: &InheritanceIndex, bridge: &MethodEntry, specialized: &MethodEntry) {
		let bridge_to_keep = match self.specialized_to_bridge.get(specialized) {
			// a class inheriting bridge methods from its superclass can bridge to the same method twice
			Some(other_bridge) => higher_method(inheritance_index, bridge, other_bridge),
			None => bridge.clone(),
		};

		self.specialized_to_bridge.insert(specialized.clone(), bridge_to_keep);
		self.bridge_to_specialized.insert(bridge.clone(), specialized.clone());
	}

	/// Also makes the specialized method known under the name of its bridge, in case the two names differ.
	pub(crate) fn process_index(&mut self) {
		let renamed: Vec<_> = self.specialized_to_bridge.iter()
			.filter(|(specialized, bridge)| specialized.name != bridge.name)
			.map(|(specialized, bridge)| (specialized.with_name(bridge.name.clone()), bridge.clone()))
			.filter(|(renamed, bridge)| renamed != bridge)
			.collect();

		self.specialized_to_bridge.extend(renamed);
	}

	pub fn is_bridge_method(&self, method: &MethodEntry) -> bool {
		self.bridge_to_specialized.contains_key(method)
	}

	pub fn is_specialized_method(&self, method: &MethodEntry) -> bool {
		self.specialized_to_bridge.contains_key(method)
	}

	/// The method the given bridge method calls.
	pub fn get_bridged_method(&self, bridge: &MethodEntry) -> Option<&MethodEntry> {
		self.bridge_to_specialized.get(bridge)
	}

	pub fn get_bridge_from_specialized(&self, specialized: &MethodEntry) -> Option<&MethodEntry> {
		self.specialized_to_bridge.get(specialized)
	}

	/// Only bridge to specialized method.
	pub fn bridge_to_specialized(&self) -> &IndexMap<MethodEntry, MethodEntry> {
		&self.bridge_to_specialized
	}

	/// Includes the specialized methods under the names of their bridges.
	pub fn specialized_to_bridge(&self) -> &IndexMap<MethodEntry, MethodEntry> {
		&self.specialized_to_bridge
	}

	pub fn remapped(&self, translator: &(impl Translator + ?Sized)) -> BridgeMethodIndex {
		fn translate_map(map: &IndexMap<MethodEntry, MethodEntry>, translator: &(impl Translator + ?Sized)) -> IndexMap<MethodEntry, MethodEntry> {
			map.iter()
				.map(|(a, b)| (a.translate(translator), b.translate(translator)))
				.collect()
		}

		BridgeMethodIndex {
			bridge_to_specialized: translate_map(&self.bridge_to_specialized, translator),
			specialized_to_bridge: translate_map(&self.specialized_to_bridge, translator),
		}
	}
}

fn higher_method(inheritance_index: &InheritanceIndex, bridge_1: &MethodEntry, bridge_2: &MethodEntry) -> MethodEntry {
	if inheritance_index.get_descendants(&bridge_1.parent).contains(&bridge_2.parent) {
		bridge_1.clone()
	} else if inheritance_index.get_descendants(&bridge_2.parent).contains(&bridge_1.parent) {
		bridge_2.clone()
	} else {
		warn!("unrelated bridge methods {bridge_1} and {bridge_2} for the same method, keeping {bridge_2}");
		bridge_2.clone()
	}
}

fn is_potential_bridge(
	entry_index: &EntryIndex,
	inheritance_index: &InheritanceIndex,
	bridge: &MethodEntry,
	access: AccessFlags,
	specialized: &MethodEntry,
) -> Result<bool> {
	// bridge methods only exist for inheritance, which these methods don't take part in
	if access.is_private() || access.is_final() || access.is_static() {
		return Ok(false);
	}

	let bridge_desc = bridge.desc.parse()?;
	let specialized_desc = specialized.desc.parse()?;

	if bridge_desc.parameter_descriptors.len() != specialized_desc.parameter_descriptors.len() {
		return Ok(false);
	}

	let compatible = |bridge: &Type, specialized: &Type| are_types_bridge_compatible(entry_index, inheritance_index, bridge, specialized);

	let arguments_compatible = bridge_desc.parameter_descriptors.iter()
		.zip(&specialized_desc.parameter_descriptors)
		.all(|(bridge, specialized)| compatible(bridge, specialized));

	Ok(arguments_compatible && match (&bridge_desc.return_descriptor, &specialized_desc.return_descriptor) {
		(Some(bridge), Some(specialized)) => compatible(bridge, specialized),
		(None, None) => true,
		_ => false,
	})
}

/// Either the types are equal, or both are classes that differ through a generic.
fn are_types_bridge_compatible(entry_index: &EntryIndex, inheritance_index: &InheritanceIndex, bridge: &Type, specialized: &Type) -> bool {
	match (bridge, specialized) {
		(a, b) if a == b => true,
		(Type::Object(bridge), Type::Object(specialized)) => {
			let relation = inheritance_index.compute_class_relation(entry_index, &ClassEntry::new(specialized), &ClassEntry::new(bridge));
			relation != Relation::Unrelated
		},
		_ => false,
	}
}
