//! Functions to read and write mappings in the "enigma zip" format: the same layout as the enigma directory format,
//! but inside a zip file.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use log::info;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};
use duke::entry::Entry;
use crate::mapping::EntryMapping;
use crate::save::{MappingSaveParameters, MAPPING_EXTENSION};
use crate::tree::EntryTree;

pub fn read_file(path: impl AsRef<Path>) -> Result<EntryTree<EntryMapping>> {
	let path = path.as_ref();
	let file = File::open(path)
		.with_context(|| anyhow!("failed to open mappings zip file {path:?}"))?;

	read(file)
		.with_context(|| anyhow!("failed to read mappings zip file {path:?}"))
}

pub fn read(reader: impl Read + Seek) -> Result<EntryTree<EntryMapping>> {
	let mut zip = ZipArchive::new(reader)?;

	let mut names: Vec<String> = zip.file_names()
		.filter(|name| name.ends_with(&format!(".{MAPPING_EXTENSION}")))
		.filter(|name| !name.split('/').any(|part| part.starts_with('.')))
		.map(str::to_owned)
		.collect();
	names.sort();

	let mut mappings = EntryTree::new();
	for name in names {
		let file = zip.by_name(&name)
			.with_context(|| anyhow!("failed to open {name:?} in zip file"))?;

		let parsed = crate::enigma_file::read(file)
			.with_context(|| anyhow!("failed to read mappings file {name:?} as enigma file"))?;
		crate::enigma_file::merge_into(&mut mappings, &parsed);
	}

	Ok(mappings)
}

/// Writes the mappings into a zip file, replacing it only once everything is written.
pub fn write_file(mappings: &EntryTree<EntryMapping>, path: impl AsRef<Path>, parameters: &MappingSaveParameters) -> Result<()> {
	let path = path.as_ref();
	crate::enigma_file::write_atomically(path, |w| {
		write(mappings, w, parameters)?;
		Ok(())
	})
		.with_context(|| anyhow!("failed to write mappings to zip file {path:?}"))?;

	info!("wrote mappings to zip file {path:?}");
	Ok(())
}

/// Writes the mappings as a zip file with one file per top level class. Gives back the writer.
pub fn write<W: Write + Seek>(mappings: &EntryTree<EntryMapping>, writer: W, parameters: &MappingSaveParameters) -> Result<W> {
	let mut zip = ZipWriter::new(writer);

	let mut roots: Vec<_> = mappings.root_nodes().collect();
	roots.sort_by_key(|node| node.entry());

	for root in roots {
		let Entry::Class(class) = root.entry() else { continue };
		let name = parameters.file_name_format.file_name(class, mappings);

		zip.start_file(name.as_str(), SimpleFileOptions::default())
			.with_context(|| anyhow!("failed to start zip entry {name:?}"))?;
		crate::enigma_file::write_root(&mut zip, root)?;
	}

	Ok(zip.finish()?)
}

#[cfg(test)]
mod testing {
	use std::io::Cursor;
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::save::{MappingFileNameFormat, MappingSaveParameters};

	#[test]
	fn write_then_read() -> Result<()> {
		let input = "\
CLASS a com/example/Foo
	FIELD a name I
CLASS b
	METHOD c run ()V
		ARG 1 task
";
		let mappings = crate::enigma_file::read(input.as_bytes())?;

		let parameters = MappingSaveParameters::new(MappingFileNameFormat::ByDeobf);
		let zip = crate::enigma_zip::write(&mappings, Cursor::new(Vec::new()), &parameters)?;

		let mut names: Vec<_> = zip::ZipArchive::new(Cursor::new(zip.get_ref()))?
			.file_names()
			.map(str::to_owned)
			.collect();
		names.sort();
		assert_eq!(names, vec!["b.mapping", "com/example/Foo.mapping"]);

		let read = crate::enigma_zip::read(Cursor::new(zip.into_inner()))?;
		assert_eq!(read, mappings);
		Ok(())
	}
}
