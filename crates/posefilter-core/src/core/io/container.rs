use super::compress::{self, InputStream};
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Literal prefix of every header line; ten consecutive `#` characters.
pub const RECORD_DELIMITER: &str = "##########";

/// Fixed literal markers and labels of the container text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFormat {
    /// Prefix of every header line.
    pub delimiter: String,
    /// Substring identifying the compound-name header field.
    pub name_label: String,
    /// Substring identifying the total-energy header field.
    pub energy_label: String,
    /// Prefix of the line opening a pose's structural block.
    pub block_start_marker: String,
    /// Prefix of the line opening a pose's fixed-format content.
    pub fixed_content_marker: String,
}

impl Default for ContainerFormat {
    fn default() -> Self {
        Self {
            delimiter: RECORD_DELIMITER.to_string(),
            name_label: "  Name".to_string(),
            energy_label: "Total Energy".to_string(),
            block_start_marker: "@<TRIPOS>MOLECULE".to_string(),
            fixed_content_marker: "@<TRIPOS>ATOM".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record at line {line}: {kind}")]
    MalformedRecord {
        line: usize,
        kind: MalformedRecordKind,
    },
    #[error("Invalid total energy on line {line} (value: '{value}')")]
    InvalidEnergy { line: usize, value: String },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedRecordKind {
    #[error("energy field appears before any compound name field in its header block")]
    EnergyBeforeName,
    #[error("header block has no compound name field")]
    MissingName,
    #[error("header block has no total energy field")]
    MissingEnergy,
}

/// A recognized header field with its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderField {
    CompoundName(String),
    TotalEnergy(f64),
}

/// One line of the container, classified. Every variant keeps the verbatim text,
/// including its line terminator.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedLine {
    /// A header line without a recognized field.
    Delimiter(String),
    /// A header line carrying a recognized field.
    Field { field: HeaderField, text: String },
    /// Anything outside the header blocks.
    Payload(String),
}

impl ClassifiedLine {
    pub fn text(&self) -> &str {
        match self {
            ClassifiedLine::Delimiter(text)
            | ClassifiedLine::Field { text, .. }
            | ClassifiedLine::Payload(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ClassifiedLine::Delimiter(text)
            | ClassifiedLine::Field { text, .. }
            | ClassifiedLine::Payload(text) => text,
        }
    }

    pub fn is_header(&self) -> bool {
        !matches!(self, ClassifiedLine::Payload(_))
    }
}

/// Classifies a single line; `line_number` is 1-based and used for diagnostics.
pub fn classify(
    text: String,
    format: &ContainerFormat,
    line_number: usize,
) -> Result<ClassifiedLine, ContainerError> {
    if !text.starts_with(&format.delimiter) {
        return Ok(ClassifiedLine::Payload(text));
    }

    let last_token = text.split_whitespace().last().unwrap_or("");
    if text.contains(&format.name_label) {
        let field = HeaderField::CompoundName(last_token.to_string());
        return Ok(ClassifiedLine::Field { field, text });
    }
    if text.contains(&format.energy_label) {
        let energy: f64 = last_token
            .parse()
            .map_err(|_| ContainerError::InvalidEnergy {
                line: line_number,
                value: last_token.to_string(),
            })?;
        let field = HeaderField::TotalEnergy(energy);
        return Ok(ClassifiedLine::Field { field, text });
    }
    Ok(ClassifiedLine::Delimiter(text))
}

/// Pull-based, forward-only reader of classified container lines.
///
/// Only the current line is buffered, so arbitrarily large containers can be scanned.
/// Callers stop early by simply not pulling further; the underlying handle is released
/// when the reader is dropped.
pub struct RecordReader<R> {
    reader: R,
    format: ContainerFormat,
    line_number: usize,
}

impl RecordReader<InputStream> {
    /// Opens a container file, decompressing it if it is gzip-compressed.
    pub fn open(path: &Path, format: ContainerFormat) -> Result<Self, ContainerError> {
        let reader = Self::new(compress::open_input(path)?, format);
        debug!(
            path = %path.display(),
            compressed = reader.is_compressed(),
            "Opened container."
        );
        Ok(reader)
    }

    /// Whether the underlying file turned out to be gzip-compressed.
    pub fn is_compressed(&self) -> bool {
        self.reader.get_ref().is_compressed()
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, format: ContainerFormat) -> Self {
        Self {
            reader,
            format,
            line_number: 0,
        }
    }

    pub fn format(&self) -> &ContainerFormat {
        &self.format
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the next classified line, or `None` at end of stream.
    pub fn next_line(&mut self) -> Result<Option<ClassifiedLine>, ContainerError> {
        let mut text = String::new();
        if self.reader.read_line(&mut text)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        classify(text, &self.format, self.line_number).map(Some)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<ClassifiedLine, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
##########                 Name:                 ZINC000001\n\
##########           Total Energy:               -32.51\n\
##########          Ligand Source File:         input.mol2\n\
@<TRIPOS>MOLECULE\n\
ZINC000001\n";

    fn reader(text: &str) -> RecordReader<Cursor<Vec<u8>>> {
        RecordReader::new(
            Cursor::new(text.as_bytes().to_vec()),
            ContainerFormat::default(),
        )
    }

    #[test]
    fn classifies_fields_delimiters_and_payload() {
        let lines: Vec<ClassifiedLine> = reader(SAMPLE).map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 5);
        assert!(matches!(
            &lines[0],
            ClassifiedLine::Field { field: HeaderField::CompoundName(name), .. } if name == "ZINC000001"
        ));
        assert!(matches!(
            &lines[1],
            ClassifiedLine::Field { field: HeaderField::TotalEnergy(e), .. } if *e == -32.51
        ));
        assert!(matches!(&lines[2], ClassifiedLine::Delimiter(_)));
        assert_eq!(lines[3], ClassifiedLine::Payload("@<TRIPOS>MOLECULE\n".into()));
        assert!(!lines[4].is_header());
    }

    #[test]
    fn lines_keep_their_verbatim_text() {
        let joined: String = reader(SAMPLE).map(|l| l.unwrap().into_text()).collect();
        assert_eq!(joined, SAMPLE);
    }

    #[test]
    fn final_line_without_newline_is_preserved() {
        let text = "##########  Name: LIG1\npayload";
        let joined: String = reader(text).map(|l| l.unwrap().into_text()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn field_labels_only_count_on_delimiter_lines() {
        let mut r = reader("Total Energy: 1.0\n  Name: X\n");
        assert!(matches!(r.next_line().unwrap(), Some(ClassifiedLine::Payload(_))));
        assert!(matches!(r.next_line().unwrap(), Some(ClassifiedLine::Payload(_))));
        assert!(r.next_line().unwrap().is_none());
        assert_eq!(r.line_number(), 2);
    }

    #[test]
    fn unparseable_energy_reports_line_number() {
        let mut r = reader("@<TRIPOS>MOLECULE\n##########  Total Energy:  n/a\n");
        r.next_line().unwrap();
        match r.next_line() {
            Err(ContainerError::InvalidEnergy { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "n/a");
            }
            other => panic!("expected InvalidEnergy, got {:?}", other),
        }
    }

    #[test]
    fn open_detects_compression_from_content() {
        use flate2::{Compression, write::GzEncoder};
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("poses.mol2");
        let zipped = dir.path().join("poses.mol2.gz");
        std::fs::write(&plain, SAMPLE).unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        std::fs::write(&zipped, encoder.finish().unwrap()).unwrap();

        assert!(!RecordReader::open(&plain, ContainerFormat::default()).unwrap().is_compressed());
        let mut reader = RecordReader::open(&zipped, ContainerFormat::default()).unwrap();
        assert!(reader.is_compressed());
        assert!(reader.next_line().unwrap().unwrap().is_header());
    }

    #[test]
    fn custom_labels_are_honored() {
        let format = ContainerFormat {
            name_label: "Title".into(),
            energy_label: "Score".into(),
            ..Default::default()
        };
        let line = classify("########## Title: abc\n".into(), &format, 1).unwrap();
        assert!(matches!(
            line,
            ClassifiedLine::Field { field: HeaderField::CompoundName(name), .. } if name == "abc"
        ));
        let line = classify("########## Score: -1.5\n".into(), &format, 2).unwrap();
        assert!(matches!(
            line,
            ClassifiedLine::Field { field: HeaderField::TotalEnergy(e), .. } if e == -1.5
        ));
    }
}
