use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::io;

/// Reads a count listing and returns its meaningful lines.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - See `significant_lines` for the filtering rules
pub(crate) fn read_listing<P: AsRef<Path>>(filename: P) -> io::Result<Vec<(usize, String)>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(significant_lines(&contents))
}

/// Keeps the lines that carry a record, paired with their 1-based line number.
///
/// Blank lines and lines starting with `#` are dropped.
pub(crate) fn significant_lines(contents: &str) -> Vec<(usize, String)> {
	contents
		.lines()
		.enumerate()
		.map(|(index, line)| (index + 1, line.trim()))
		.filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
		.map(|(number, line)| (number, line.to_owned()))
		.collect()
}

/// Splits a listing line into its words and trailing count.
///
/// Example:
/// `"the cat 3"` → `(["the", "cat"], 3)`
pub(crate) fn parse_record(line: &str) -> Result<(Vec<String>, u64), String> {
	let mut tokens: Vec<&str> = line.split_whitespace().collect();
	let count = tokens.pop().ok_or_else(|| "empty record".to_owned())?;
	let count: u64 = count
		.parse()
		.map_err(|_| format!("invalid count '{}'", count))?;
	if tokens.is_empty() {
		return Err("record has a count but no words".to_owned());
	}
	Ok((tokens.into_iter().map(str::to_owned).collect(), count))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_significant_lines() {
		let lines = significant_lines("# header\nthe 4\n\n  the cat 2  \n#the dog 1\n");
		assert_eq!(lines, vec![(2, "the 4".to_owned()), (4, "the cat 2".to_owned())]);
	}

	#[test]
	fn test_parse_record() {
		assert_eq!(parse_record("the cat 3"), Ok((vec!["the".to_owned(), "cat".to_owned()], 3)));
		assert!(parse_record("the cat").is_err());
		assert!(parse_record("7").is_err());
		assert!(parse_record("the -1").is_err());
	}
}
