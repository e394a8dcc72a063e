//! Functions to read and write mappings in the "enigma directory" format.
//!
//! # Reading
//! Every `.mapping` file below the directory is read as an enigma file, in the order of their file names. Hidden files
//! and directories (starting with a `.`) are skipped.
//!
//! # Writing
//! Each top level class gets its own file, named after the class as chosen by the [`MappingFileNameFormat`]. With
//! [`write_delta`] only the files of classes touched by a [`MappingDelta`] are written, and files of classes whose
//! file name changed are removed, together with package directories left empty.

use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use rayon::prelude::*;
use walkdir::WalkDir;
use duke::entry::{ClassEntry, Entry};
use crate::mapping::EntryMapping;
use crate::save::{MappingFileNameFormat, MappingSaveParameters, MAPPING_EXTENSION};
use crate::tree::{EntryTree, MappingDelta};

pub fn read(path: impl AsRef<Path>) -> Result<EntryTree<EntryMapping>> {
	let path = path.as_ref();

	WalkDir::new(path)
		.sort_by_file_name() // make it deterministic
		.into_iter()
		.filter_entry(|entry| entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.'))
		.filter(|entry| entry.as_ref().map_or(true, |entry| {
			entry.file_type().is_file() && entry.path().extension().is_some_and(|ex| ex == MAPPING_EXTENSION)
		}))
		.map(|res| res.map(|entry| entry.into_path()))
		.try_fold(EntryTree::new(), |mut mappings, file| {
			let file = file.with_context(|| anyhow!("failed to walk mappings directory {path:?}"))?;
			crate::enigma_file::read_file_into(file, &mut mappings)?;
			Ok(mappings)
		})
}

fn class_file(root: &Path, file_name: &str) -> Result<PathBuf> {
	let relative = Path::new(file_name);
	if relative.is_absolute() || file_name.split('/').any(|part| part == ".." || part.is_empty()) {
		bail!("mapping file name {file_name:?} doesn't stay inside {root:?}");
	}
	Ok(root.join(relative))
}

fn write_classes(mappings: &EntryTree<EntryMapping>, classes: &[&ClassEntry], path: &Path, format: MappingFileNameFormat) -> Result<()> {
	classes.par_iter().try_for_each(|&class| {
		let Some(root) = mappings.find_node(&Entry::Class(class.clone())) else {
			return Ok(());
		};

		let target = class_file(path, &format.file_name(class, mappings))?;
		crate::enigma_file::write_atomically(&target, |w| crate::enigma_file::write_root(w, root))
			.with_context(|| anyhow!("failed to write mappings of {class} to {target:?}"))
	})
}

/// Writes all mappings, one file per top level class.
pub fn write(mappings: &EntryTree<EntryMapping>, path: impl AsRef<Path>, parameters: &MappingSaveParameters) -> Result<()> {
	let path = path.as_ref();

	let classes: Vec<&ClassEntry> = mappings.root_entries()
		.filter_map(Entry::as_class)
		.collect();

	write_classes(mappings, &classes, path, parameters.file_name_format)
		.with_context(|| anyhow!("failed to write mappings to directory {path:?}"))?;

	info!("wrote mappings of {} classes to {path:?}", classes.len());
	Ok(())
}

/// Writes the files of all top level classes changed in `delta`.
///
/// Files of changed classes that now have a different file name, or no mappings at all, are deleted first.
pub fn write_delta(
	mappings: &EntryTree<EntryMapping>,
	delta: &MappingDelta<EntryMapping>,
	path: impl AsRef<Path>,
	parameters: &MappingSaveParameters,
) -> Result<()> {
	let path = path.as_ref();
	let format = parameters.file_name_format;

	let changed: Vec<&ClassEntry> = delta.changed_roots()
		.into_iter()
		.filter_map(Entry::as_class)
		.collect();

	apply_deletions(mappings, &delta.base_mappings, &changed, path, format)
		.with_context(|| anyhow!("failed to delete old mapping files from {path:?}"))?;

	write_classes(mappings, &changed, path, format)
		.with_context(|| anyhow!("failed to write mappings to directory {path:?}"))?;

	info!("wrote mappings of {} changed classes to {path:?}", changed.len());
	Ok(())
}

fn apply_deletions(
	mappings: &EntryTree<EntryMapping>,
	old_mappings: &EntryTree<EntryMapping>,
	changed: &[&ClassEntry],
	path: &Path,
	format: MappingFileNameFormat,
) -> Result<()> {
	let mut deleted = Vec::new();

	for &class in changed {
		let old_name = format.file_name(class, old_mappings);
		let still_there = mappings.find_node(&Entry::Class(class.clone())).is_some();
		if still_there && old_name == format.file_name(class, mappings) {
			continue;
		}

		let file = class_file(path, &old_name)?;
		if file.is_file() {
			std::fs::remove_file(&file)
				.with_context(|| anyhow!("failed to delete mappings file {file:?}"))?;
			debug!("deleted mappings file {file:?} of {class}");
			deleted.push(file);
		}
	}

	for file in deleted {
		let mut directory = file.parent();
		while let Some(dir) = directory.filter(|dir| *dir != path && dir.starts_with(path)) {
			let empty = std::fs::read_dir(dir)
				.with_context(|| anyhow!("failed to list directory {dir:?}"))?
				.next()
				.is_none();
			if !empty {
				break;
			}
			std::fs::remove_dir(dir)
				.with_context(|| anyhow!("failed to delete empty package directory {dir:?}"))?;
			directory = dir.parent();
		}
	}

	Ok(())
}
