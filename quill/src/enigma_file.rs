//! Functions to read and write mappings in the enigma format, all in one file.
//!
//! # Reading
//! Use [`read_file`] for reading a file from a path, or [`read`] for any [`Read`]er. Reading a file either succeeds
//! completely or leaves nothing behind: with [`read_file_into`] the mappings are only merged into the target tree once
//! the whole file was parsed.
//!
//! # Writing
//! [`write`][fn@write] writes into any [`Write`]r, [`write_string`] gives back a `String`. [`write_file`] writes into a
//! temporary file next to the target and then moves it into place, so that the target is never left half written.
//!
//! The writer sorts everything: fields come first, then methods, then parameters and then inner classes, each sorted by
//! their obfuscated names.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use crate::lines::{EnigmaLine, IndentedLines, Keyword};
use crate::mapping::{AccessModifier, EntryMapping};
use crate::tree::{EntryTree, NodeRef};

/// Reads an enigma mappings file.
pub fn read_file(path: impl AsRef<Path>) -> Result<EntryTree<EntryMapping>> {
	let path = path.as_ref();
	let file = File::open(path)
		.with_context(|| anyhow!("failed to open mappings file {path:?}"))?;

	read(file)
		.with_context(|| anyhow!("failed to read mappings file {path:?} as enigma file"))
}

/// Reads an enigma mappings file, and adds all mappings from it to the given tree.
///
/// If the file can't be read, the tree is left unchanged.
pub fn read_file_into(path: impl AsRef<Path>, mappings: &mut EntryTree<EntryMapping>) -> Result<()> {
	let parsed = read_file(path)?;
	merge_into(mappings, &parsed);
	Ok(())
}

pub(crate) fn merge_into(mappings: &mut EntryTree<EntryMapping>, other: &EntryTree<EntryMapping>) {
	for (entry, mapping) in other.iter() {
		mappings.insert(entry.clone(), Some(mapping.clone()));
	}
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads mappings in the enigma format.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use duke::entry::{ClassEntry, Entry, FieldEntry};
///
/// let string = "\
/// CLASS a com/example/Foo
/// 	FIELD a name Ljava/lang/String;
/// 		COMMENT The name of this foo.
/// ";
///
/// let mappings = quill::enigma_file::read(string.as_bytes()).unwrap();
///
/// let field = Entry::Field(FieldEntry::new(ClassEntry::new("a"), "a", "Ljava/lang/String;"));
/// let mapping = mappings.get(&field).unwrap();
/// assert_eq!(mapping.target_name.as_deref(), Some("name"));
/// assert_eq!(mapping.javadoc.as_deref(), Some("The name of this foo."));
/// ```
pub fn read(reader: impl Read) -> Result<EntryTree<EntryMapping>> {
	let mut mappings = EntryTree::new();

	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.filter_map(|(line_number, line)| match line {
			Ok(line) => EnigmaLine::parse(line_number + 1, &line).transpose(),
			Err(e) => Some(Err(anyhow!(e).context(format!("failed to read line {}", line_number + 1)))),
		})
		.peekable();

	IndentedLines::new(&mut lines).on_every_line(|iter, line| {
		match line.keyword {
			Keyword::Class => parse_class(&mut mappings, iter, line, None),
			keyword => bail!("unexpected {keyword:?} at the top level, only `CLASS` is allowed there"),
		}
	}).context("reading lines")?;

	Ok(mappings)
}

fn parse_class(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<EnigmaLine>>>,
	line: EnigmaLine,
	outer: Option<&ClassEntry>,
) -> Result<()> {
	let (obf, deobf, modifier) = match line.fields.as_slice() {
		[obf] => (obf, None, None),
		[obf, modifier] if AccessModifier::is_modifier(modifier) => (obf, None, Some(modifier)),
		[obf, deobf] => (obf, Some(deobf), None),
		[obf, deobf, modifier] => (obf, Some(deobf), Some(modifier)),
		slice => bail!("illegal number of arguments ({}) for class mapping, expected 1-3, got {slice:?}", slice.len()),
	};

	let class = match outer {
		// some files repeat the full name for inner classes
		Some(outer) if obf.starts_with(&format!("{}$", outer.full_name())) => ClassEntry::new(obf),
		Some(outer) => ClassEntry::inner(outer.clone(), obf),
		None => ClassEntry::new(obf),
	};
	let deobf = deobf.map(String::as_str).map(|name| match outer {
		Some(_) => name.rsplit(['$', '/']).next().unwrap_or(name),
		None => name,
	});
	let mut mapping = mapping(deobf, modifier)?;

	iter.next_level().on_every_line(|iter, line| {
		match line.keyword {
			Keyword::Class => parse_class(mappings, iter, line, Some(&class)),
			Keyword::Field => parse_field(mappings, iter, line, &class),
			Keyword::Method => parse_method(mappings, iter, line, &class),
			Keyword::Comment => add_comment(&mut mapping.javadoc, &line),
			Keyword::Parameter => bail!("unexpected `ARG` inside a class, parameters belong to methods"),
		}
	}).context("reading `CLASS` sub-sections")?;

	insert_mapping(mappings, Entry::Class(class), mapping);
	Ok(())
}

fn parse_field(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<EnigmaLine>>>,
	line: EnigmaLine,
	class: &ClassEntry,
) -> Result<()> {
	let (obf, deobf, desc, modifier) = match line.fields.as_slice() {
		[obf, desc] => (obf, None, desc, None),
		[obf, desc, modifier] if AccessModifier::is_modifier(modifier) => (obf, None, desc, Some(modifier)),
		[obf, deobf, desc] => (obf, Some(deobf), desc, None),
		[obf, deobf, desc, modifier] => (obf, Some(deobf), desc, Some(modifier)),
		slice => bail!("illegal number of arguments ({}) for field mapping, expected 2-4, got {slice:?}", slice.len()),
	};

	let field = FieldEntry::new(class.clone(), obf, desc.as_str());
	let mut mapping = mapping(deobf.map(String::as_str), modifier)?;

	iter.next_level().on_every_line(|_, line| {
		match line.keyword {
			Keyword::Comment => add_comment(&mut mapping.javadoc, &line),
			keyword => bail!("unexpected {keyword:?} inside a field, only `COMMENT` is allowed there"),
		}
	}).context("reading `FIELD` sub-sections")?;

	insert_mapping(mappings, Entry::Field(field), mapping);
	Ok(())
}

fn parse_method(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<EnigmaLine>>>,
	line: EnigmaLine,
	class: &ClassEntry,
) -> Result<()> {
	let (obf, deobf, desc, modifier) = match line.fields.as_slice() {
		[obf, desc] => (obf, None, desc, None),
		[obf, desc, modifier] if AccessModifier::is_modifier(modifier) => (obf, None, desc, Some(modifier)),
		[obf, deobf, desc] => (obf, Some(deobf), desc, None),
		[obf, deobf, desc, modifier] => (obf, Some(deobf), desc, Some(modifier)),
		slice => bail!("illegal number of arguments ({}) for method mapping, expected 2-4, got {slice:?}", slice.len()),
	};

	let method = MethodEntry::new(class.clone(), obf, desc.as_str());
	let mut mapping = mapping(deobf.map(String::as_str), modifier)?;

	iter.next_level().on_every_line(|iter, line| {
		match line.keyword {
			Keyword::Parameter => parse_parameter(mappings, iter, line, &method),
			Keyword::Comment => add_comment(&mut mapping.javadoc, &line),
			keyword => bail!("unexpected {keyword:?} inside a method, allowed are `ARG` and `COMMENT`"),
		}
	}).context("reading `METHOD` sub-sections")?;

	insert_mapping(mappings, Entry::Method(method), mapping);
	Ok(())
}

fn parse_parameter(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<EnigmaLine>>>,
	line: EnigmaLine,
	method: &MethodEntry,
) -> Result<()> {
	let (raw_index, deobf) = match line.fields.as_slice() {
		[raw_index] => (raw_index, None),
		[raw_index, deobf] => (raw_index, Some(deobf)),
		slice => bail!("illegal number of arguments ({}) for parameter mapping, expected 1-2, got {slice:?}", slice.len()),
	};

	let index: u16 = raw_index.parse()
		.with_context(|| anyhow!("illegal parameter index {raw_index:?}"))?;

	let local = LocalVariableEntry::new(method.clone(), index, "", true);
	let mut mapping = mapping(deobf.map(String::as_str), None)?;

	iter.next_level().on_every_line(|_, line| {
		match line.keyword {
			Keyword::Comment => add_comment(&mut mapping.javadoc, &line),
			keyword => bail!("unexpected {keyword:?} inside a parameter, only `COMMENT` is allowed there"),
		}
	}).context("reading `ARG` sub-sections")?;

	insert_mapping(mappings, Entry::LocalVariable(local), mapping);
	Ok(())
}

/// Lines without a name, an access modifier and a comment only name the parent of other mappings.
pub(crate) fn insert_mapping(mappings: &mut EntryTree<EntryMapping>, entry: Entry, mapping: EntryMapping) {
	if mapping != EntryMapping::DEFAULT {
		mappings.insert(entry, Some(mapping));
	}
}

fn mapping(deobf: Option<&str>, modifier: Option<&String>) -> Result<EntryMapping> {
	Ok(EntryMapping {
		target_name: deobf.filter(|name| *name != "-").map(str::to_owned),
		access_modifier: modifier.map(|modifier| AccessModifier::parse(modifier)).transpose()?.unwrap_or_default(),
		javadoc: None,
	})
}

fn add_comment(javadoc: &mut Option<String>, line: &EnigmaLine) -> Result<()> {
	let text = unescape(line.fields.first().map_or("", String::as_str));

	match javadoc {
		Some(javadoc) => {
			javadoc.push('\n');
			javadoc.push_str(&text);
		},
		None => *javadoc = Some(text),
	}
	Ok(())
}

pub(crate) fn escape(s: &str) -> String {
	let mut escaped = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'\\' => escaped.push_str("\\\\"),
			'\t' => escaped.push_str("\\t"),
			'\r' => escaped.push_str("\\r"),
			'\n' => escaped.push_str("\\n"),
			c => escaped.push(c),
		}
	}
	escaped
}

pub(crate) fn unescape(s: &str) -> String {
	let mut unescaped = String::with_capacity(s.len());
	let mut chars = s.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			unescaped.push(c);
			continue;
		}
		match chars.next() {
			Some('\\') => unescaped.push('\\'),
			Some('t') => unescaped.push('\t'),
			Some('r') => unescaped.push('\r'),
			Some('n') => unescaped.push('\n'),
			Some(other) => {
				unescaped.push('\\');
				unescaped.push(other);
			},
			None => unescaped.push('\\'),
		}
	}
	unescaped
}

/// Writes the mappings into a file, replacing it only once everything is written.
pub fn write_file(mappings: &EntryTree<EntryMapping>, path: impl AsRef<Path>) -> Result<()> {
	let path = path.as_ref();
	write_atomically(path, |w| write(mappings, w))
		.with_context(|| anyhow!("failed to write mappings to file {path:?}"))
}

/// Lets `f` write into a temporary file next to `path`, then moves that file to `path`.
pub(crate) fn write_atomically(path: &Path, f: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)
			.with_context(|| anyhow!("failed to create parent directories for {path:?}"))?;
	}

	let mut temp = OsString::from(path.as_os_str());
	temp.push(".tmp");
	let temp = PathBuf::from(temp);

	let result = File::create(&temp)
		.with_context(|| anyhow!("failed to create temporary file {temp:?}"))
		.and_then(|file| {
			let mut writer = BufWriter::new(file);
			f(&mut writer)?;
			writer.flush()?;
			Ok(())
		})
		.and_then(|()| std::fs::rename(&temp, path)
			.with_context(|| anyhow!("failed to move {temp:?} to {path:?}")));

	if result.is_err() {
		// the temporary file might not exist at all
		let _ = std::fs::remove_file(&temp);
	}
	result
}

/// Writes the mappings into a `String`.
///
/// This is of most use in test cases, together with the `pretty_assertions` crate for viewing string diffs.
pub fn write_string(mappings: &EntryTree<EntryMapping>) -> Result<String> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

#[allow(clippy::tabs_in_doc_comments)]
/// Writes the mappings in the enigma format.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let input = "\
/// CLASS b com/example/Bar
/// CLASS a com/example/Foo
/// 	CLASS c Inner
/// 	METHOD b run ()V
/// 	FIELD a name I ACC:PRIVATE
/// ";
///
/// let mappings = quill::enigma_file::read(input.as_bytes()).unwrap();
/// let mut written = Vec::new();
/// quill::enigma_file::write(&mappings, &mut written).unwrap();
///
/// assert_eq!(String::from_utf8(written).unwrap(), "\
/// CLASS a com/example/Foo
/// 	FIELD a name I ACC:PRIVATE
/// 	METHOD b run ()V
/// 	CLASS c Inner
/// CLASS b com/example/Bar
/// ");
/// ```
pub fn write(mappings: &EntryTree<EntryMapping>, w: &mut impl Write) -> Result<()> {
	// the buffering makes it much faster
	let mut w = BufWriter::new(w);

	let mut roots: Vec<_> = mappings.root_nodes().collect();
	roots.sort_by_key(|node| node.entry());
	for root in roots {
		write_class(&mut w, root, 0)?;
	}

	w.flush()?;
	Ok(())
}

/// Writes a single top level class with everything inside it.
pub(crate) fn write_root(w: &mut impl Write, root: NodeRef<'_, EntryMapping>) -> Result<()> {
	write_class(w, root, 0)
}

pub(crate) fn indent(w: &mut impl Write, depth: usize) -> Result<()> {
	for _ in 0..depth {
		w.write_all(b"\t")?;
	}
	Ok(())
}

fn write_tail(w: &mut impl Write, mapping: Option<&EntryMapping>, desc: Option<&str>) -> Result<()> {
	if let Some(name) = mapping.and_then(|mapping| mapping.target_name.as_deref()) {
		write!(w, " {name}")?;
	}
	if let Some(desc) = desc {
		write!(w, " {desc}")?;
	}
	if let Some(modifier) = mapping.map(|mapping| mapping.access_modifier).filter(|x| *x != AccessModifier::Unchanged) {
		write!(w, " {}", modifier.as_str())?;
	}
	writeln!(w)?;
	Ok(())
}

fn write_comments(w: &mut impl Write, mapping: Option<&EntryMapping>, depth: usize) -> Result<()> {
	if let Some(javadoc) = mapping.and_then(|mapping| mapping.javadoc.as_deref()) {
		for line in javadoc.split('\n') {
			indent(w, depth)?;
			if line.is_empty() {
				writeln!(w, "COMMENT")?;
			} else {
				writeln!(w, "COMMENT {}", escape(line))?;
			}
		}
	}
	Ok(())
}

pub(crate) fn sorted_children<'a>(node: &NodeRef<'a, EntryMapping>) -> Vec<NodeRef<'a, EntryMapping>> {
	fn group(entry: &Entry) -> u8 {
		match entry {
			Entry::Field(_) => 0,
			Entry::Method(_) => 1,
			Entry::LocalVariable(_) => 2,
			Entry::Class(_) => 3,
		}
	}

	let mut children: Vec<_> = node.children().collect();
	children.sort_by(|a, b| {
		group(a.entry()).cmp(&group(b.entry()))
			.then_with(|| a.entry().cmp(b.entry()))
	});
	children
}

fn write_class(w: &mut impl Write, node: NodeRef<'_, EntryMapping>, depth: usize) -> Result<()> {
	let Entry::Class(class) = node.entry() else {
		bail!("expected a class, got {}", node.entry());
	};

	let name = if depth == 0 { class.full_name() } else { class.name().to_owned() };
	indent(w, depth)?;
	write!(w, "CLASS {name}")?;
	write_tail(w, node.value(), None)?;
	write_comments(w, node.value(), depth + 1)?;

	for child in sorted_children(&node) {
		match child.entry() {
			Entry::Class(_) => write_class(w, child, depth + 1)?,
			Entry::Field(field) => {
				indent(w, depth + 1)?;
				write!(w, "FIELD {}", field.name)?;
				write_tail(w, child.value(), Some(field.desc.as_str()))?;
				write_comments(w, child.value(), depth + 2)?;
			},
			Entry::Method(method) => write_method(w, child, method, depth + 1)?,
			Entry::LocalVariable(local) => bail!("local variable {local} can't be inside class {class}"),
		}
	}
	Ok(())
}

fn write_method(w: &mut impl Write, node: NodeRef<'_, EntryMapping>, method: &MethodEntry, depth: usize) -> Result<()> {
	indent(w, depth)?;
	write!(w, "METHOD {}", method.name)?;
	write_tail(w, node.value(), Some(method.desc.as_str()))?;
	write_comments(w, node.value(), depth + 1)?;

	for child in sorted_children(&node) {
		let Entry::LocalVariable(local) = child.entry() else {
			bail!("only local variables can be inside method {method}, got {}", child.entry());
		};
		let Some(mapping) = child.value() else { continue };

		let name = match (&mapping.target_name, &mapping.javadoc) {
			(Some(name), _) => name.as_str(),
			(None, Some(_)) => "-",
			(None, None) => continue,
		};

		indent(w, depth + 1)?;
		writeln!(w, "ARG {} {name}", local.index)?;
		write_comments(w, Some(mapping), depth + 2)?;
	}
	Ok(())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::enigma_file::{escape, unescape};

	#[test]
	fn escaping() {
		let text = "a\\b\tc\rd";
		assert_eq!(escape(text), "a\\\\b\\tc\\rd");
		assert_eq!(unescape(&escape(text)), text);
		assert_eq!(unescape("trailing \\"), "trailing \\");
		assert_eq!(unescape("unknown \\q"), "unknown \\q");
	}
}
