use std::cmp::Ordering;
use std::fmt::Debug;
use std::iter::Peekable;
use anyhow::{anyhow, bail, Context, Result};

pub(crate) trait Line: Debug {
	fn depth(&self) -> usize;
	fn line_number(&self) -> usize;
}

/// Iterates over the lines of one indentation level, stopping at the first line that is indented less.
///
/// A line that's indented more than expected is an error: it has no parent line to belong to.
pub(crate) struct IndentedLines<'a, I: Iterator> {
	depth: usize,
	iter: &'a mut Peekable<I>,
}

impl<'a, I, L> IndentedLines<'a, I>
where
	I: Iterator<Item=Result<L>>,
	L: Line,
{
	pub(crate) fn new(iter: &'a mut Peekable<I>) -> IndentedLines<'a, I> {
		IndentedLines { depth: 0, iter }
	}

	/// The lines belonging to the line just returned.
	pub(crate) fn next_level(&mut self) -> IndentedLines<'_, I> {
		IndentedLines {
			depth: self.depth + 1,
			iter: self.iter,
		}
	}

	pub(crate) fn on_every_line(mut self, mut f: impl FnMut(&mut Self, L) -> Result<()>) -> Result<()> {
		while let Some(line) = self.next() {
			let line = line?;
			let line_number = line.line_number();

			f(&mut self, line)
				.with_context(|| anyhow!("in line {line_number}"))?;
		}
		Ok(())
	}
}

impl<I, L> Iterator for IndentedLines<'_, I>
where
	I: Iterator<Item=Result<L>>,
	L: Line,
{
	type Item = Result<L>;

	fn next(&mut self) -> Option<Self::Item> {
		match self.iter.peek()? {
			Ok(line) => match line.depth().cmp(&self.depth) {
				Ordering::Less => None,
				Ordering::Equal => self.iter.next(),
				Ordering::Greater => Some(Err(anyhow!(
					"expected an indentation of {} in line {}, got {}: {line:?}", self.depth, line.line_number(), line.depth()
				))),
			},
			Err(_) => self.iter.next(),
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Keyword {
	Class,
	Field,
	Method,
	Parameter,
	Comment,
}

impl Keyword {
	fn parse(s: &str) -> Result<Keyword> {
		Ok(match s.to_ascii_uppercase().as_str() {
			"CLASS" => Keyword::Class,
			"FIELD" => Keyword::Field,
			"METHOD" => Keyword::Method,
			"ARG" | "PARAMETER" => Keyword::Parameter,
			"COMMENT" => Keyword::Comment,
			_ => bail!("unknown keyword {s:?}, allowed are `CLASS`, `FIELD`, `METHOD`, `ARG`, `PARAMETER` and `COMMENT`"),
		})
	}
}

/// A single non-empty line of an enigma mappings file.
#[derive(Debug)]
pub(crate) struct EnigmaLine {
	line_number: usize,
	depth: usize,
	pub(crate) keyword: Keyword,
	pub(crate) fields: Vec<String>,
}

impl EnigmaLine {
	const JAVA_WHITESPACE: [char; 6] = [' ', '\t', '\n', '\x0b', '\x0c', '\x0d'];

	/// Splits a line into its fields. Returns `None` for lines that are empty after removing `#` comments.
	///
	/// The text of a `COMMENT` line is kept as a single field, untouched, starting after the whitespace following the
	/// keyword. A `#` in there is part of the text.
	pub(crate) fn parse(line_number: usize, line: &str) -> Result<Option<EnigmaLine>> {
		let content = line.trim_start_matches('\t');
		let depth = line.len() - content.len();

		let mut tokens = content.split(Self::JAVA_WHITESPACE).filter(|token| !token.is_empty());
		let Some(first) = tokens.next() else {
			return Ok(None);
		};
		if first.starts_with('#') {
			return Ok(None);
		}

		let keyword = Keyword::parse(first)
			.with_context(|| anyhow!("in line {line_number}"))?;

		let fields = if keyword == Keyword::Comment {
			// the text is kept as is, including runs of spaces and a `#`
			let rest = &content.trim_start_matches(Self::JAVA_WHITESPACE)[first.len()..];
			let mut chars = rest.chars();
			chars.next();
			vec![chars.as_str().to_owned()]
		} else {
			tokens.take_while(|token| !token.starts_with('#'))
				.map(|token| token.split_once('#').map_or(token, |(before, _)| before))
				.map(str::to_owned)
				.collect()
		};

		Ok(Some(EnigmaLine { line_number, depth, keyword, fields }))
	}
}

impl Line for EnigmaLine {
	fn depth(&self) -> usize {
		self.depth
	}

	fn line_number(&self) -> usize {
		self.line_number
	}
}

/// A single non-empty line of a tiny v2 file: the tab separated fields after the indentation.
#[derive(Debug)]
pub(crate) struct TinyLine {
	line_number: usize,
	depth: usize,
	pub(crate) key: String,
	fields: std::vec::IntoIter<String>,
}

impl TinyLine {
	pub(crate) fn parse(line_number: usize, line: &str) -> TinyLine {
		let content = line.trim_start_matches('\t');
		let depth = line.len() - content.len();

		let mut fields = content.split('\t').map(str::to_owned);
		let key = fields.next().unwrap_or_default();
		let fields: Vec<String> = fields.collect();

		TinyLine { line_number, depth, key, fields: fields.into_iter() }
	}

	pub(crate) fn next(&mut self) -> Result<String> {
		self.fields.next()
			.with_context(|| anyhow!("expected another field in line {}: {self:?}", self.line_number))
	}

	/// The last field of the line.
	pub(crate) fn end(mut self) -> Result<String> {
		let next = self.next()?;
		if !self.fields.as_slice().is_empty() {
			bail!("line {} contained more fields than expected: {self:?}", self.line_number);
		}
		Ok(next)
	}

	/// The remaining fields, one per namespace. Empty names are `None`.
	pub(crate) fn names<const N: usize>(self) -> Result<[Option<String>; N]> {
		let line_number = self.line_number;
		let names: Vec<_> = self.fields
			.map(|name| Some(name).filter(|name| !name.is_empty()))
			.collect();

		names.try_into()
			.map_err(|names: Vec<_>| anyhow!("line {line_number} contained {} names instead of the expected {N}: {names:?}", names.len()))
	}
}

impl Line for TinyLine {
	fn depth(&self) -> usize {
		self.depth
	}

	fn line_number(&self) -> usize {
		self.line_number
	}
}
