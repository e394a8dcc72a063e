use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;
use duke::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use quill::mapping::{AccessModifier, EntryMapping};
use quill::tree::EntryTree;

const INPUT: &str = "\
# mappings of the example jar
CLASS a com/example/Foo
	COMMENT A foo, as in #1.
	COMMENT
	COMMENT Tabs\\tand back\\\\slashes survive.
	FIELD b - I ACC:PRIVATE
	field a name Ljava/lang/String; # the name
	METHOD c run (La$d;I)V
		COMMENT Runs it.
		ARG 1 inner
		PARAMETER 2 times
			COMMENT How often.
	CLASS d Inner
		METHOD <init> (La;)V
CLASS e
	METHOD f ()V ACC:PUBLIC
";

fn class(name: &str) -> ClassEntry {
	ClassEntry::new(name)
}

fn get<'a>(mappings: &'a EntryTree<EntryMapping>, entry: Entry) -> Result<&'a EntryMapping> {
	mappings.get(&entry).ok_or_else(|| anyhow!("no mapping for {entry}"))
}

#[test]
fn read() -> Result<()> {
	let mappings = quill::enigma_file::read(INPUT.as_bytes())?;

	let foo = get(&mappings, Entry::Class(class("a")))?;
	assert_eq!(foo.target_name.as_deref(), Some("com/example/Foo"));
	assert_eq!(foo.javadoc.as_deref(), Some("A foo, as in #1.\n\nTabs\tand back\\slashes survive."));

	let b = get(&mappings, Entry::Field(FieldEntry::new(class("a"), "b", "I")))?;
	assert_eq!(b, &EntryMapping::DEFAULT.with_modifier(AccessModifier::Private));

	let name = get(&mappings, Entry::Field(FieldEntry::new(class("a"), "a", "Ljava/lang/String;")))?;
	assert_eq!(name, &EntryMapping::new("name"));

	let run = MethodEntry::new(class("a"), "c", "(La$d;I)V");
	assert_eq!(get(&mappings, Entry::Method(run.clone()))?.javadoc.as_deref(), Some("Runs it."));
	assert_eq!(
		get(&mappings, Entry::LocalVariable(LocalVariableEntry::new(run.clone(), 1, "", true)))?,
		&EntryMapping::new("inner")
	);
	assert_eq!(
		get(&mappings, Entry::LocalVariable(LocalVariableEntry::new(run, 2, "", true)))?,
		&EntryMapping::new("times").with_docs(Some("How often.".to_owned()))
	);

	assert_eq!(get(&mappings, Entry::Class(class("a$d")))?, &EntryMapping::new("Inner"));
	// a line without a name only names the parent of other lines
	assert!(!mappings.contains(&Entry::Method(MethodEntry::new(class("a$d"), "<init>", "(La;)V"))));

	assert!(mappings.find_node(&Entry::Class(class("e"))).is_some());
	assert!(!mappings.contains(&Entry::Class(class("e"))));
	assert_eq!(
		get(&mappings, Entry::Method(MethodEntry::new(class("e"), "f", "()V")))?.access_modifier,
		AccessModifier::Public
	);

	assert_eq!(mappings.len(), 8);
	Ok(())
}

#[test]
fn write_sorts_and_normalizes() -> Result<()> {
	let mappings = quill::enigma_file::read(INPUT.as_bytes())?;
	let written = quill::enigma_file::write_string(&mappings)?;

	assert_eq!(written, "\
CLASS a com/example/Foo
	COMMENT A foo, as in #1.
	COMMENT
	COMMENT Tabs\\tand back\\\\slashes survive.
	FIELD a name Ljava/lang/String;
	FIELD b I ACC:PRIVATE
	METHOD c run (La$d;I)V
		COMMENT Runs it.
		ARG 1 inner
		ARG 2 times
			COMMENT How often.
	CLASS d Inner
CLASS e
	METHOD f ()V ACC:PUBLIC
");

	let read_again = quill::enigma_file::read(written.as_bytes())?;
	assert_eq!(read_again, mappings);
	Ok(())
}

#[test]
fn errors_name_the_line() -> Result<()> {
	let input = "\
CLASS a b
	FIELD a b
	FIELD c d I
		ARG 1 x
";
	let error = quill::enigma_file::read(input.as_bytes())
		.err()
		.ok_or_else(|| anyhow!("reading should fail"))?;
	let message = format!("{error:#}");

	assert!(message.contains("in line 1"), "{message}");
	assert!(message.contains("in line 3"), "{message}");
	assert!(message.contains("inside a field"), "{message}");
	Ok(())
}

#[test]
fn failed_reads_leave_the_tree_alone() -> Result<()> {
	let dir = std::env::temp_dir().join(format!("quill-enigma-file-{}", std::process::id()));
	std::fs::create_dir_all(&dir)?;

	let broken = dir.join("broken.mapping");
	std::fs::write(&broken, "CLASS a b\n\tFIELD a c I\n\t\t\tCOMMENT too deep\n")?;

	let mut mappings = EntryTree::new();
	mappings.insert(Entry::Class(class("z")), Some(EntryMapping::new("y")));
	let before = mappings.clone();

	assert!(quill::enigma_file::read_file_into(&broken, &mut mappings).is_err());
	assert_eq!(mappings, before);

	let good = dir.join("good.mapping");
	quill::enigma_file::write_file(&quill::enigma_file::read("CLASS a b\n".as_bytes())?, &good)?;
	quill::enigma_file::read_file_into(&good, &mut mappings)?;
	assert_eq!(mappings.len(), 2);
	assert!(!dir.join("good.mapping.tmp").exists());

	std::fs::remove_dir_all(&dir)?;
	Ok(())
}

/// Mappings as an editor would produce them: members mapped in classes that keep their names, documentation
/// with indentation and runs of spaces, and parameters with only documentation.
fn hand_built() -> EntryTree<EntryMapping> {
	let run = MethodEntry::new(class("a"), "b", "(II)V");
	[
		(Entry::Field(FieldEntry::new(class("a"), "f", "I")), EntryMapping::new("count")),
		(Entry::Method(run.clone()), EntryMapping::DEFAULT.with_docs(Some("<pre>\n    foo();  bar();\n</pre>".to_owned()))),
		(Entry::LocalVariable(LocalVariableEntry::new(run.clone(), 1, "", true)), EntryMapping::new("times")),
		(
			Entry::LocalVariable(LocalVariableEntry::new(run, 2, "", true)),
			EntryMapping::DEFAULT.with_docs(Some(" leading space, trailing tab\t".to_owned())),
		),
		(Entry::Class(class("c$d")), EntryMapping::new("Inner").with_docs(Some("first\n\n  third".to_owned()))),
		(Entry::Method(MethodEntry::new(class("c$d"), "e", "()V")), EntryMapping::DEFAULT.with_modifier(AccessModifier::Protected)),
	].into_iter().collect()
}

#[test]
fn write_then_read_gives_the_same_tree() -> Result<()> {
	let mappings = hand_built();
	let written = quill::enigma_file::write_string(&mappings)?;

	assert_eq!(written, "\
CLASS a
	FIELD f count I
	METHOD b (II)V
		COMMENT <pre>
		COMMENT     foo();  bar();
		COMMENT </pre>
		ARG 1 times
		ARG 2 -
			COMMENT  leading space, trailing tab\\t
CLASS c
	CLASS d Inner
		COMMENT first
		COMMENT
		COMMENT   third
		METHOD e ()V ACC:PROTECTED
");

	let read_again = quill::enigma_file::read(written.as_bytes())?;
	assert_eq!(read_again, mappings);
	assert_eq!(read_again.len(), 6);
	assert!(!read_again.contains(&Entry::Class(class("a"))));
	Ok(())
}
