//! Functions to read and write mappings in the "Tiny v2" format, with two namespaces: the obfuscated names and the
//! deobfuscated names.
//!
//! # Reading
//! Use [`read_file`] for reading a `.tiny` file from a path, or [`read`] for any [`Read`]er. [`read_with_namespaces`]
//! also gives back the names of the two namespaces from the header.
//!
//! A class line holds full names, also for inner classes. The tree only stores the inner name of those, and only if it
//! differs from the obfuscated one. Local variables (`v` lines) are skipped.
//!
//! # Writing
//! [`write`][fn@write] writes into any [`Write`]r, [`write_string`] gives back a `String`, and [`write_file`] replaces a
//! file only once everything is written. All writing sorts the classes and their members.
//!
//! The format has no place for access modifiers, they're left out with a warning.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use crate::enigma_file::{escape, indent, insert_mapping, sorted_children, unescape};
use crate::lines::{IndentedLines, Line, TinyLine};
use crate::mapping::{AccessModifier, EntryMapping};
use crate::resolver::VoidEntryResolver;
use crate::translator::{MappingTranslator, Translator};
use crate::tree::{EntryTree, NodeRef};

/// The names of the two namespaces of a tiny v2 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
	pub obf: String,
	pub deobf: String,
}

impl Namespaces {
	pub fn new(obf: impl Into<String>, deobf: impl Into<String>) -> Namespaces {
		Namespaces { obf: obf.into(), deobf: deobf.into() }
	}
}

impl Default for Namespaces {
	fn default() -> Self {
		Namespaces::new("intermediary", "named")
	}
}

/// Reads a tiny v2 file.
pub fn read_file(path: impl AsRef<Path>) -> Result<EntryTree<EntryMapping>> {
	let path = path.as_ref();
	let file = File::open(path)
		.with_context(|| anyhow!("failed to open mappings file {path:?}"))?;

	read(file)
		.with_context(|| anyhow!("failed to read mappings file {path:?} as tiny v2 file"))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads mappings in the tiny v2 format.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use duke::entry::{ClassEntry, Entry, FieldEntry};
///
/// let string = "\
/// tiny	2	0	intermediary	named
/// c	a	com/example/Foo
/// 	f	Ljava/lang/String;	a	name
/// 		c	The name of this foo.
/// ";
///
/// let mappings = quill::tiny_v2::read(string.as_bytes()).unwrap();
///
/// let field = Entry::Field(FieldEntry::new(ClassEntry::new("a"), "a", "Ljava/lang/String;"));
/// let mapping = mappings.get(&field).unwrap();
/// assert_eq!(mapping.target_name.as_deref(), Some("name"));
/// assert_eq!(mapping.javadoc.as_deref(), Some("The name of this foo."));
/// ```
pub fn read(reader: impl Read) -> Result<EntryTree<EntryMapping>> {
	read_with_namespaces(reader).map(|(_, mappings)| mappings)
}

/// Reads mappings in the tiny v2 format, together with the namespaces named in the header.
pub fn read_with_namespaces(reader: impl Read) -> Result<(Namespaces, EntryTree<EntryMapping>)> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.filter_map(|(line_number, line)| match line {
			Ok(line) if line.is_empty() => None,
			Ok(line) => Some(Ok(TinyLine::parse(line_number + 1, &line))),
			Err(e) => Some(Err(anyhow!(e).context(format!("failed to read line {}", line_number + 1)))),
		})
		.peekable();

	let mut header = lines.next().context("no header line")??;
	if header.key != "tiny" || header.next()? != "2" || header.next()? != "0" {
		bail!("header version isn't tiny v2.0, in line {header:?}");
	}
	let [Some(obf), Some(deobf)] = header.names::<2>()? else {
		bail!("the namespaces in the header must not be empty");
	};
	let namespaces = Namespaces { obf, deobf };

	let mut mappings = EntryTree::new();
	let mut escaped_names = false;

	let mut iter = IndentedLines::new(&mut lines);
	iter.next_level().on_every_line(|_, line| {
		if line.key == "escaped-names" {
			escaped_names = true;
		}
		Ok(())
	}).context("reading header properties")?;

	iter.on_every_line(|iter, line| {
		match line.key.as_str() {
			"c" => parse_class(&mut mappings, iter, line, escaped_names),
			key => bail!("unexpected `{key}` at the top level, only `c` is allowed there"),
		}
	}).context("reading lines")?;

	if let Some(line) = lines.next() {
		bail!("expected end of input, got: {line:?}");
	}

	Ok((namespaces, mappings))
}

fn name(name: Option<String>, escaped_names: bool) -> Option<String> {
	if escaped_names {
		name.map(|name| unescape(&name))
	} else {
		name
	}
}

fn obf_name(line_number: usize, name: Option<String>, escaped_names: bool) -> Result<String> {
	self::name(name, escaped_names)
		.with_context(|| anyhow!("missing obfuscated name in line {line_number}"))
}

fn parse_class(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<TinyLine>>>,
	line: TinyLine,
	escaped_names: bool,
) -> Result<()> {
	let line_number = line.line_number();
	let [obf, deobf] = line.names::<2>()?;

	let class = ClassEntry::new(obf_name(line_number, obf, escaped_names)?);
	let target_name = name(deobf, escaped_names).and_then(|deobf| {
		let inner_name = match class.outer() {
			Some(_) => deobf.rsplit('$').next().unwrap_or(deobf.as_str()),
			None => deobf.as_str(),
		};
		(inner_name != class.name()).then(|| inner_name.to_owned())
	});
	let mut mapping = EntryMapping { target_name, ..EntryMapping::DEFAULT };

	iter.next_level().on_every_line(|iter, line| {
		match line.key.as_str() {
			"f" => parse_field(mappings, iter, line, &class, escaped_names),
			"m" => parse_method(mappings, iter, line, &class, escaped_names),
			"c" => add_comment(&mut mapping.javadoc, line),
			key => bail!("unexpected `{key}` inside a class, allowed are `f`, `m` and `c`"),
		}
	}).context("reading class sub-sections")?;

	insert_mapping(mappings, Entry::Class(class), mapping);
	Ok(())
}

fn parse_field(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<TinyLine>>>,
	mut line: TinyLine,
	class: &ClassEntry,
	escaped_names: bool,
) -> Result<()> {
	let line_number = line.line_number();
	let desc = line.next()?;
	let [obf, deobf] = line.names::<2>()?;

	let field = FieldEntry::new(class.clone(), obf_name(line_number, obf, escaped_names)?, desc.as_str());
	let mut mapping = EntryMapping { target_name: name(deobf, escaped_names), ..EntryMapping::DEFAULT };

	iter.next_level().on_every_line(|_, line| {
		match line.key.as_str() {
			"c" => add_comment(&mut mapping.javadoc, line),
			key => bail!("unexpected `{key}` inside a field, only `c` is allowed there"),
		}
	}).context("reading field sub-sections")?;

	insert_mapping(mappings, Entry::Field(field), mapping);
	Ok(())
}

fn parse_method(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<TinyLine>>>,
	mut line: TinyLine,
	class: &ClassEntry,
	escaped_names: bool,
) -> Result<()> {
	let line_number = line.line_number();
	let desc = line.next()?;
	let [obf, deobf] = line.names::<2>()?;

	let method = MethodEntry::new(class.clone(), obf_name(line_number, obf, escaped_names)?, desc.as_str());
	let mut mapping = EntryMapping { target_name: name(deobf, escaped_names), ..EntryMapping::DEFAULT };

	iter.next_level().on_every_line(|iter, line| {
		match line.key.as_str() {
			"p" => parse_parameter(mappings, iter, line, &method, escaped_names),
			"v" => iter.next_level().on_every_line(|_, _| Ok(())),
			"c" => add_comment(&mut mapping.javadoc, line),
			key => bail!("unexpected `{key}` inside a method, allowed are `p`, `v` and `c`"),
		}
	}).context("reading method sub-sections")?;

	insert_mapping(mappings, Entry::Method(method), mapping);
	Ok(())
}

fn parse_parameter(
	mappings: &mut EntryTree<EntryMapping>,
	iter: &mut IndentedLines<impl Iterator<Item=Result<TinyLine>>>,
	mut line: TinyLine,
	method: &MethodEntry,
	escaped_names: bool,
) -> Result<()> {
	let raw_index = line.next()?;
	let index: u16 = raw_index.parse()
		.with_context(|| anyhow!("illegal parameter index {raw_index:?}"))?;
	// the obfuscated name of a parameter is usually empty
	let [_, deobf] = line.names::<2>()?;

	let local = LocalVariableEntry::new(method.clone(), index, "", true);
	let mut mapping = EntryMapping { target_name: name(deobf, escaped_names), ..EntryMapping::DEFAULT };

	iter.next_level().on_every_line(|_, line| {
		match line.key.as_str() {
			"c" => add_comment(&mut mapping.javadoc, line),
			key => bail!("unexpected `{key}` inside a parameter, only `c` is allowed there"),
		}
	}).context("reading parameter sub-sections")?;

	insert_mapping(mappings, Entry::LocalVariable(local), mapping);
	Ok(())
}

fn add_comment(javadoc: &mut Option<String>, line: TinyLine) -> Result<()> {
	let comment = unescape(&line.end()?);
	if let Some(javadoc) = javadoc {
		bail!("only one comment is allowed, got {javadoc:?} and {comment:?}");
	}
	*javadoc = Some(comment);
	Ok(())
}

/// Writes the mappings into a file, replacing it only once everything is written.
pub fn write_file(mappings: &EntryTree<EntryMapping>, namespaces: &Namespaces, path: impl AsRef<Path>) -> Result<()> {
	let path = path.as_ref();
	crate::enigma_file::write_atomically(path, |w| write(mappings, namespaces, w))
		.with_context(|| anyhow!("failed to write mappings to file {path:?}"))
}

/// Writes the mappings into a `String`.
pub fn write_string(mappings: &EntryTree<EntryMapping>, namespaces: &Namespaces) -> Result<String> {
	let mut vec = Vec::new();
	write(mappings, namespaces, &mut vec)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Whether the node, or anything below it that's written together with it, has a mapping. Inner classes get their
/// own lines.
fn is_mapped(node: &NodeRef<'_, EntryMapping>) -> bool {
	node.has_value() || node.children()
		.any(|child| !matches!(child.entry(), Entry::Class(_)) && is_mapped(&child))
}

struct Writer<'a, W> {
	w: W,
	translator: MappingTranslator<'a, VoidEntryResolver>,
	dropped_modifiers: usize,
}

impl<W: Write> Writer<'_, W> {
	fn names(&mut self, obf: &str, deobf: Option<&str>) -> Result<()> {
		writeln!(self.w, "\t{obf}\t{}", deobf.unwrap_or(""))?;
		Ok(())
	}

	fn comment(&mut self, mapping: Option<&EntryMapping>, depth: usize) -> Result<()> {
		if mapping.is_some_and(|mapping| mapping.access_modifier != AccessModifier::Unchanged) {
			self.dropped_modifiers += 1;
		}
		if let Some(javadoc) = mapping.and_then(|mapping| mapping.javadoc.as_deref()) {
			indent(&mut self.w, depth)?;
			writeln!(self.w, "c\t{}", escape(javadoc))?;
		}
		Ok(())
	}

	fn class(&mut self, node: NodeRef<'_, EntryMapping>, class: &ClassEntry) -> Result<()> {
		let obf = class.full_name();
		let deobf = self.translator.translate_class(class).full_name();

		write!(self.w, "c")?;
		self.names(&obf, Some(deobf.as_str()).filter(|deobf| *deobf != obf))?;
		self.comment(node.value(), 1)?;

		for child in sorted_children(&node) {
			if !is_mapped(&child) {
				continue;
			}
			match child.entry() {
				Entry::Field(field) => {
					write!(self.w, "\tf\t{}", field.desc.as_str())?;
					self.names(&field.name, target_name(child))?;
					self.comment(child.value(), 2)?;
				},
				Entry::Method(method) => self.method(child, method)?,
				Entry::Class(_) | Entry::LocalVariable(_) => {},
			}
		}
		Ok(())
	}

	fn method(&mut self, node: NodeRef<'_, EntryMapping>, method: &MethodEntry) -> Result<()> {
		write!(self.w, "\tm\t{}", method.desc.as_str())?;
		self.names(&method.name, target_name(node))?;
		self.comment(node.value(), 2)?;

		for child in sorted_children(&node) {
			let Entry::LocalVariable(local) = child.entry() else {
				bail!("only local variables can be inside method {method}, got {}", child.entry());
			};
			if !local.parameter || !child.has_value() {
				continue;
			}

			write!(self.w, "\t\tp\t{}", local.index)?;
			self.names("", target_name(child))?;
			self.comment(child.value(), 3)?;
		}
		Ok(())
	}
}

fn target_name<'a>(node: NodeRef<'a, EntryMapping>) -> Option<&'a str> {
	node.value().and_then(|mapping| mapping.target_name.as_deref())
}

#[allow(clippy::tabs_in_doc_comments)]
/// Writes the mappings in the tiny v2 format.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use quill::tiny_v2::Namespaces;
///
/// let input = "\
/// CLASS b com/example/Bar
/// CLASS a com/example/Foo
/// 	CLASS c Inner
/// 	METHOD b run ()V
/// 		ARG 1 times
/// 	FIELD a name I
/// ";
///
/// let mappings = quill::enigma_file::read(input.as_bytes()).unwrap();
/// let written = quill::tiny_v2::write_string(&mappings, &Namespaces::default()).unwrap();
///
/// assert_eq!(written, "\
/// tiny	2	0	intermediary	named
/// c	a	com/example/Foo
/// 	f	I	a	name
/// 	m	()V	b	run
/// 		p	1		times
/// c	a$c	com/example/Foo$Inner
/// c	b	com/example/Bar
/// ");
/// ```
pub fn write(mappings: &EntryTree<EntryMapping>, namespaces: &Namespaces, w: &mut impl Write) -> Result<()> {
	let mut writer = Writer {
		// the buffering makes it much faster
		w: BufWriter::new(w),
		translator: MappingTranslator::new(mappings, VoidEntryResolver),
		dropped_modifiers: 0,
	};

	writeln!(writer.w, "tiny\t2\t0\t{}\t{}", namespaces.obf, namespaces.deobf)?;

	let mut classes: Vec<_> = mappings.nodes().into_iter()
		.filter(|node| matches!(node.entry(), Entry::Class(_)) && is_mapped(node))
		.collect();
	classes.sort_by_key(|node| node.entry());
	for node in classes {
		if let Entry::Class(class) = node.entry() {
			writer.class(node, class)?;
		}
	}

	if writer.dropped_modifiers > 0 {
		warn!("tiny v2 can't store access modifiers, left out {} of them", writer.dropped_modifiers);
	}

	writer.w.flush()?;
	Ok(())
}
