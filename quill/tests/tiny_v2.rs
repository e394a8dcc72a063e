use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use quill::mapping::{AccessModifier, EntryMapping};
use quill::tiny_v2::Namespaces;
use quill::tree::EntryTree;

const INPUT: &str = "\
tiny	2	0	official	named
	escaped-names
c	a	com/example/Foo
	c	A foo.\\nWith\\ttabs.
	f	I	b	count
	m	(I)V	c	run
		c	Runs it.
		p	1		times
			c	How often.
		v	2	5		local
	m	()V	d\t
		p	0		self
c	a$e	com/example/Foo$Inner
c	a$f	com/example/Foo$f
	f	La;	g	outer
c	h	h
	c	Only documented.
";

fn class(name: &str) -> ClassEntry {
	ClassEntry::new(name)
}

fn get<'a>(mappings: &'a EntryTree<EntryMapping>, entry: Entry) -> Result<&'a EntryMapping> {
	mappings.get(&entry).ok_or_else(|| anyhow!("no mapping for {entry}"))
}

#[test]
fn read() -> Result<()> {
	let (namespaces, mappings) = quill::tiny_v2::read_with_namespaces(INPUT.as_bytes())?;
	assert_eq!(namespaces, Namespaces::new("official", "named"));

	assert_eq!(
		get(&mappings, Entry::Class(class("a")))?,
		&EntryMapping::new("com/example/Foo").with_docs(Some("A foo.\nWith\ttabs.".to_owned()))
	);
	assert_eq!(get(&mappings, Entry::Field(FieldEntry::new(class("a"), "b", "I")))?, &EntryMapping::new("count"));

	let run = MethodEntry::new(class("a"), "c", "(I)V");
	assert_eq!(get(&mappings, Entry::Method(run.clone()))?.javadoc.as_deref(), Some("Runs it."));
	assert_eq!(
		get(&mappings, Entry::LocalVariable(LocalVariableEntry::new(run, 1, "", true)))?,
		&EntryMapping::new("times").with_docs(Some("How often.".to_owned()))
	);

	// only a parameter is mapped
	let d = MethodEntry::new(class("a"), "d", "()V");
	assert!(!mappings.contains(&Entry::Method(d.clone())));
	assert_eq!(get(&mappings, Entry::LocalVariable(LocalVariableEntry::new(d, 0, "", true)))?, &EntryMapping::new("self"));

	// inner classes only keep their own name, and only if it changed
	assert_eq!(get(&mappings, Entry::Class(class("a$e")))?, &EntryMapping::new("Inner"));
	assert!(!mappings.contains(&Entry::Class(class("a$f"))));
	assert_eq!(get(&mappings, Entry::Field(FieldEntry::new(class("a$f"), "g", "La;")))?, &EntryMapping::new("outer"));

	assert_eq!(
		get(&mappings, Entry::Class(class("h")))?,
		&EntryMapping::DEFAULT.with_docs(Some("Only documented.".to_owned()))
	);

	assert_eq!(mappings.len(), 8);
	Ok(())
}

#[test]
fn write_sorts_and_leaves_out_unmapped_classes() -> Result<()> {
	let mappings = quill::tiny_v2::read(INPUT.as_bytes())?;
	let written = quill::tiny_v2::write_string(&mappings, &Namespaces::new("official", "named"))?;

	assert_eq!(written, "\
tiny	2	0	official	named
c	a	com/example/Foo
	c	A foo.\\nWith\\ttabs.
	f	I	b	count
	m	(I)V	c	run
		c	Runs it.
		p	1		times
			c	How often.
	m	()V	d\t
		p	0		self
c	a$e	com/example/Foo$Inner
c	a$f	com/example/Foo$f
	f	La;	g	outer
c	h\t
	c	Only documented.
");

	assert_eq!(quill::tiny_v2::read(written.as_bytes())?, mappings);
	Ok(())
}

#[test]
fn enigma_mappings_survive_tiny_v2() -> Result<()> {
	let input = "\
CLASS a com/example/Foo
	COMMENT <pre>
	COMMENT     foo();  bar();
	COMMENT </pre>
	FIELD b count I
	METHOD c (I)V
		ARG 1 times
	CLASS d Inner
CLASS e
	METHOD f run ()V
		COMMENT Runs it.
";
	let mappings = quill::enigma_file::read(input.as_bytes())?;

	let tiny = quill::tiny_v2::write_string(&mappings, &Namespaces::default())?;
	let read = quill::tiny_v2::read(tiny.as_bytes())?;
	assert_eq!(read, mappings);

	assert_eq!(quill::enigma_file::write_string(&read)?, input);
	Ok(())
}

#[test]
fn access_modifiers_are_left_out() -> Result<()> {
	let mappings: EntryTree<EntryMapping> = [
		(Entry::Class(class("a")), EntryMapping::new("com/example/Foo").with_modifier(AccessModifier::Public)),
		(Entry::Method(MethodEntry::new(class("a"), "b", "()V")), EntryMapping::DEFAULT.with_modifier(AccessModifier::Private)),
	].into_iter().collect();

	let written = quill::tiny_v2::write_string(&mappings, &Namespaces::default())?;
	assert_eq!(written, "\
tiny	2	0	intermediary	named
c	a	com/example/Foo
	m	()V	b\t
");

	let read = quill::tiny_v2::read(written.as_bytes())?;
	assert_eq!(read.len(), 1);
	assert_eq!(read.get(&Entry::Class(class("a"))), Some(&EntryMapping::new("com/example/Foo")));
	Ok(())
}

#[test]
fn malformed_files_are_rejected() {
	let cases = [
		"",
		"tiny\t1\t0\ta\tb\n",
		"tiny\t2\t0\ta\n",
		"tiny\t2\t0\ta\tb\nc\ta\n",
		"tiny\t2\t0\ta\tb\nf\tI\ta\tb\n",
		"tiny\t2\t0\ta\tb\nc\ta\tb\n\tc\tone\n\tc\ttwo\n",
		"tiny\t2\t0\ta\tb\nc\ta\tb\n\t\tf\tI\ta\tb\n",
		"tiny\t2\t0\ta\tb\nc\ta\tb\n\tm\t()V\ta\tb\n\t\tp\tx\t\tc\n",
	];
	for case in cases {
		assert!(quill::tiny_v2::read(case.as_bytes()).is_err(), "{case:?}");
	}
}

#[test]
fn write_file_then_read_file() -> Result<()> {
	let dir = std::env::temp_dir().join(format!("quill-tiny-v2-{}", std::process::id()));
	std::fs::create_dir_all(&dir)?;
	let path = dir.join("mappings.tiny");

	let mappings = quill::tiny_v2::read(INPUT.as_bytes())?;
	quill::tiny_v2::write_file(&mappings, &Namespaces::default(), &path)?;
	assert_eq!(quill::tiny_v2::read_file(&path)?, mappings);

	std::fs::remove_dir_all(&dir)?;
	Ok(())
}
