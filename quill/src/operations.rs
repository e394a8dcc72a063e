//! Operations on whole mapping trees.

use indexmap::IndexSet;
use duke::entry::Entry;
use crate::mapping::EntryMapping;
use crate::resolver::VoidEntryResolver;
use crate::translator::{MappingTranslator, Translator};
use crate::tree::EntryTree;

/// Swaps the roles of the obfuscated and the deobfuscated names.
///
/// The resulting tree is keyed by the deobfuscated entries, and maps classes, fields and methods back to their
/// obfuscated names. Local variables keep their mapping, they are only moved to the deobfuscated method.
pub fn invert(mappings: &EntryTree<EntryMapping>) -> EntryTree<EntryMapping> {
	let translator = MappingTranslator::new(mappings, VoidEntryResolver);
	let mut result = EntryTree::new();

	for (entry, mapping) in mappings.iter() {
		let inverted = match entry {
			Entry::LocalVariable(_) => mapping.clone(),
			_ => mapping.with_name(entry.name()),
		};
		result.insert(translator.translate_entry(entry), Some(inverted));
	}

	result
}

/// Chains two mapping trees: `left` maps from `a` to `b` names, `right` from `b` to `c` names, and the result from `a`
/// to `c` names.
///
/// With `keep_left_only`, mappings of `left` without a counterpart in `right` are kept. With `keep_right_only`,
/// mappings of `right` that nothing in `left` leads to are kept, moved back to `a` names where `left` knows them.
pub fn compose(
	left: &EntryTree<EntryMapping>,
	right: &EntryTree<EntryMapping>,
	keep_left_only: bool,
	keep_right_only: bool,
) -> EntryTree<EntryMapping> {
	let left_translator = MappingTranslator::new(left, VoidEntryResolver);
	let mut result = EntryTree::new();
	let mut added = IndexSet::new();

	for node in left.nodes() {
		let left_entry = node.entry();
		let right_entry = left_translator.translate_entry(left_entry);

		if let Some(right_mapping) = right.get(&right_entry) {
			result.insert(left_entry.clone(), Some(right_mapping.clone()));
			added.insert(right_entry);
		} else if keep_left_only {
			result.insert(left_entry.clone(), node.value().cloned());
		}
	}

	if keep_right_only {
		let inverted_left = invert(left);
		let inverse_translator = MappingTranslator::new(&inverted_left, VoidEntryResolver);

		for (right_entry, right_mapping) in right.iter() {
			if !added.contains(right_entry) {
				result.insert(inverse_translator.translate_entry(right_entry), Some(right_mapping.clone()));
			}
		}
	}

	result
}
