use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::Rules;
use crate::Result;

/// Header of a self-aware script, and the program that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShebangHeader {
    pub marker: String,
    pub first_line: Option<Vec<u8>>,
    pub body: Vec<u8>,
}

impl ShebangHeader {
    /// The bytes to evaluate. A content line found while scanning the header
    /// belongs to the program and is put back in front of the body.
    pub fn program(&self) -> Vec<u8> {
        let mut program = self.first_line.clone().unwrap_or_default();
        program.extend_from_slice(&self.body);
        program
    }
}

/// A `#!` line naming the interpreter as a word of its own: either the
/// program itself (`#!/usr/local/bin/scr`) or one of its arguments
/// (`#!/usr/bin/env scr`). `<name>.<suffix>` is accepted too.
pub fn is_marker_line(line: &[u8], rules: &Rules) -> bool {
    let Some(rest) = line.strip_prefix(b"#!") else {
        return false;
    };

    let with_suffix = format!("{}.{}", rules.interpreter, rules.suffix);
    String::from_utf8_lossy(rest).split_whitespace().any(|word| {
        let name = word.rsplit('/').next().unwrap_or(word);
        name == rules.interpreter || name == with_suffix
    })
}

/// Inspect `path` for a marker line. Returns `None` for plain source files,
/// which are meant to be included whole.
pub fn sniff(path: &Path, rules: &Rules) -> Result<Option<ShebangHeader>> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 || !is_marker_line(&line, rules) {
        return Ok(None);
    }
    let marker = String::from_utf8_lossy(line.trim_ascii_end()).into_owned();

    let mut first_line = None;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        let trimmed = line.trim_ascii();
        if trimmed == rules.code_start.as_bytes() {
            break;
        } else if !trimmed.is_empty() {
            let mut kept = trimmed.to_vec();
            kept.push(b'\n');
            first_line = Some(kept);
            break;
        }
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;

    Ok(Some(ShebangHeader {
        marker,
        first_line,
        body,
    }))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn script(contents: &[u8]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn plain_file_is_not_sniffed() {
        let file = script(b"<?php\nreturn 5;\n");
        assert_eq!(None, sniff(file.path(), &Rules::default()).unwrap());
    }

    #[test]
    fn empty_file_is_not_sniffed() {
        let file = script(b"");
        assert_eq!(None, sniff(file.path(), &Rules::default()).unwrap());
    }

    #[test]
    fn other_interpreters_are_not_markers() {
        let file = script(b"#!/usr/bin/env php\n<?php\nreturn 5;\n");
        assert_eq!(None, sniff(file.path(), &Rules::default()).unwrap());
    }

    #[test]
    fn name_must_be_a_whole_word() {
        let file = script(b"#!/home/me/scripts/bin/php\n$x = 5;\nreturn $x;\n");
        assert_eq!(None, sniff(file.path(), &Rules::default()).unwrap());

        let rules = Rules::default();
        assert!(!is_marker_line(b"#!/usr/bin/describe", &rules));
        assert!(!is_marker_line(b"#!/usr/bin/env scribe", &rules));
        assert!(!is_marker_line(b"# scr", &rules));
        assert!(is_marker_line(b"#!/usr/local/bin/scr\n", &rules));
        assert!(is_marker_line(b"#!/usr/bin/env scr script\n", &rules));
        assert!(is_marker_line(b"#!/opt/scr.php", &rules));
    }

    #[test]
    fn invalid_utf8_first_line_is_included_whole() {
        let file = script(b"<?php // \xff\xfe\nreturn 5;\n");
        assert_eq!(None, sniff(file.path(), &Rules::default()).unwrap());
    }

    #[test]
    fn body_bytes_are_kept_verbatim() {
        let file = script(b"#!/usr/bin/env scr\n<?php\necho 'caf\xe9';\n");
        let header = sniff(file.path(), &Rules::default()).unwrap().unwrap();
        assert_eq!(b"echo 'caf\xe9';\n".to_vec(), header.program());
    }

    #[test]
    fn code_start_token_ends_header() {
        let file = script(b"#!/usr/bin/env scr\n<?php\n$a = 1;\nreturn $a;\n");
        let header = sniff(file.path(), &Rules::default()).unwrap().unwrap();

        assert_eq!("#!/usr/bin/env scr", header.marker);
        assert_eq!(None, header.first_line);
        assert_eq!(b"$a = 1;\nreturn $a;\n".to_vec(), header.program());
    }

    #[test]
    fn blank_lines_before_token_are_skipped() {
        let file = script(b"#!/usr/bin/env scr\n\n   \n  <?php  \necho 1;\n");
        let header = sniff(file.path(), &Rules::default()).unwrap().unwrap();
        assert_eq!(b"echo 1;\n".to_vec(), header.program());
    }

    #[test]
    fn first_content_line_is_kept() {
        let file = script(b"#!/usr/bin/env scr\n\n  print 'hi';\nreturn 2;\n");
        let header = sniff(file.path(), &Rules::default()).unwrap().unwrap();

        assert_eq!(Some(b"print 'hi';\n".to_vec()), header.first_line);
        assert_eq!(b"return 2;\n".to_vec(), header.body);
        assert_eq!(b"print 'hi';\nreturn 2;\n".to_vec(), header.program());
    }

    #[test]
    fn marker_only_has_empty_program() {
        let file = script(b"#!/usr/bin/env scr\n");
        let header = sniff(file.path(), &Rules::default()).unwrap().unwrap();
        assert!(header.program().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = sniff(Path::new("/no/such/script.php"), &Rules::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
