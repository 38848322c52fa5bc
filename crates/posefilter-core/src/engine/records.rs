use crate::core::io::container::{
    ClassifiedLine, ContainerError, HeaderField, MalformedRecordKind, RecordReader,
};
use crate::core::models::pose::PoseRecord;
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use tracing::trace;

/// Header lines of the record currently being read.
#[derive(Debug)]
struct HeaderBlock {
    text: String,
    name: Option<String>,
    energy: Option<f64>,
    first_line: usize,
}

impl HeaderBlock {
    fn new(first_line: usize) -> Self {
        Self {
            text: String::new(),
            name: None,
            energy: None,
            first_line,
        }
    }

    fn absorb(&mut self, line: ClassifiedLine, line_number: usize) -> Result<(), ContainerError> {
        match &line {
            ClassifiedLine::Field {
                field: HeaderField::CompoundName(name),
                ..
            } => self.name = Some(name.clone()),
            ClassifiedLine::Field {
                field: HeaderField::TotalEnergy(energy),
                ..
            } => {
                if self.name.is_none() {
                    return Err(ContainerError::MalformedRecord {
                        line: line_number,
                        kind: MalformedRecordKind::EnergyBeforeName,
                    });
                }
                self.energy = Some(*energy);
            }
            _ => {}
        }
        self.text.push_str(line.text());
        Ok(())
    }

    fn finish(self, sequence_index: usize) -> Result<PoseRecord, IncompleteRecord> {
        match (self.name, self.energy) {
            (Some(name), Some(energy)) => {
                Ok(PoseRecord::new(name, sequence_index, energy, self.text))
            }
            (name, _) => Err(IncompleteRecord {
                sequence_index,
                kind: if name.is_none() {
                    MalformedRecordKind::MissingName
                } else {
                    MalformedRecordKind::MissingEnergy
                },
                compound_name: name,
                line: self.first_line,
            }),
        }
    }
}

/// A header block that closed without a compound name or without an energy.
///
/// It still occupies its `sequence_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncompleteRecord {
    pub sequence_index: usize,
    pub compound_name: Option<String>,
    /// Line of the first header line of the block.
    pub line: usize,
    pub kind: MalformedRecordKind,
}

impl IncompleteRecord {
    pub fn into_error(self) -> ContainerError {
        ContainerError::MalformedRecord {
            line: self.line,
            kind: self.kind,
        }
    }
}

/// Assembles classified lines into [`PoseRecord`]s, one per header block.
///
/// `sequence_index` counts header blocks from zero. A record is complete when the first
/// payload line after its header block is read, or at end of stream.
pub struct PoseRecords<R> {
    reader: RecordReader<R>,
    block: Option<HeaderBlock>,
    next_index: usize,
}

impl<R: BufRead> PoseRecords<R> {
    pub fn new(reader: RecordReader<R>) -> Self {
        Self {
            reader,
            block: None,
            next_index: 0,
        }
    }

    /// Number of records completed so far.
    pub fn records_read(&self) -> usize {
        self.next_index
    }

    /// Next record; an incomplete header block is an error.
    pub fn next_record(&mut self) -> Result<Option<PoseRecord>, ContainerError> {
        match self.next_entry()? {
            Some(entry) => entry.map(Some).map_err(IncompleteRecord::into_error),
            None => Ok(None),
        }
    }

    /// Next header block, complete or not. Reading may continue after an incomplete one.
    pub fn next_entry(
        &mut self,
    ) -> Result<Option<Result<PoseRecord, IncompleteRecord>>, ContainerError> {
        loop {
            let Some(line) = self.reader.next_line()? else {
                return Ok(self.block.take().map(|b| self.close(b)));
            };

            if line.is_header() {
                let line_number = self.reader.line_number();
                self.block
                    .get_or_insert_with(|| HeaderBlock::new(line_number))
                    .absorb(line, line_number)?;
            } else if let Some(block) = self.block.take() {
                return Ok(Some(self.close(block)));
            }
        }
    }

    fn close(&mut self, block: HeaderBlock) -> Result<PoseRecord, IncompleteRecord> {
        let entry = block.finish(self.next_index);
        self.next_index += 1;
        if let Ok(record) = &entry {
            trace!(
                index = record.sequence_index,
                name = %record.compound_name,
                energy = record.energy,
                "Record header closed."
            );
        }
        entry
    }
}

impl<R: BufRead> Iterator for PoseRecords<R> {
    type Item = Result<PoseRecord, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Copies the full text (header block and payload) of the selected records to `writer`.
///
/// Lines before the first header block belong to no record and are skipped. Reading
/// stops once the last selected record has been copied. Returns the number of records
/// written.
pub fn extract_records<R: BufRead, W: Write>(
    mut reader: RecordReader<R>,
    selected: &BTreeSet<usize>,
    writer: &mut W,
) -> Result<usize, ContainerError> {
    let Some(&last) = selected.last() else {
        return Ok(0);
    };

    let mut current: Option<usize> = None;
    let mut next_index = 0usize;
    let mut in_header = false;
    let mut written = 0usize;

    while let Some(line) = reader.next_line()? {
        if line.is_header() && !in_header {
            if next_index > last {
                break;
            }
            current = Some(next_index);
            next_index += 1;
            if selected.contains(&(next_index - 1)) {
                written += 1;
            }
        }
        in_header = line.is_header();

        if current.is_some_and(|i| selected.contains(&i)) {
            writer.write_all(line.text().as_bytes())?;
        }
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::container::ContainerFormat;
    use std::io::Cursor;

    fn pose(name: &str, energy: f64) -> String {
        format!(
            "##########                 Name:     {name}\n\
             ##########         Total Energy:     {energy}\n\
             @<TRIPOS>MOLECULE\n\
             {name}\n\
             @<TRIPOS>ATOM\n\
             1 C1 0.0 0.0 0.0 C.3\n"
        )
    }

    fn records(text: &str) -> PoseRecords<Cursor<Vec<u8>>> {
        PoseRecords::new(RecordReader::new(
            Cursor::new(text.as_bytes().to_vec()),
            ContainerFormat::default(),
        ))
    }

    #[test]
    fn assembles_one_record_per_header_block() {
        let text = format!("{}{}", pose("LIG1", -5.0), pose("LIG2", -7.5));
        let all: Vec<PoseRecord> = records(&text).map(|r| r.unwrap()).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].compound_name, "LIG1");
        assert_eq!(all[0].sequence_index, 0);
        assert_eq!(all[0].energy, -5.0);
        assert_eq!(all[1].compound_name, "LIG2");
        assert_eq!(all[1].sequence_index, 1);
        assert!(all[1].header_text.starts_with("##########"));
        assert_eq!(all[1].header_text.lines().count(), 2);
    }

    #[test]
    fn header_block_open_at_end_of_stream_is_emitted() {
        let text = "##########  Name: LIG9\n##########  Total Energy: 1.5\n";
        let all: Vec<PoseRecord> = records(text).map(|r| r.unwrap()).collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].header_text, text);
    }

    #[test]
    fn energy_before_name_is_malformed() {
        let text = "##########  Total Energy: 1.5\n##########  Name: LIG1\npayload\n";
        let mut r = records(text);
        assert!(matches!(
            r.next_record(),
            Err(ContainerError::MalformedRecord {
                line: 1,
                kind: MalformedRecordKind::EnergyBeforeName
            })
        ));
    }

    #[test]
    fn missing_energy_is_malformed() {
        let text = "##########  Name: LIG1\npayload\n";
        assert!(matches!(
            records(text).next_record(),
            Err(ContainerError::MalformedRecord {
                kind: MalformedRecordKind::MissingEnergy,
                ..
            })
        ));
    }

    #[test]
    fn incomplete_record_keeps_its_index_and_reading_continues() {
        let text = format!(
            "##########  Name: LIG0\npayload\n##########  Score: 2.0\npayload\n{}",
            pose("LIG2", -1.0)
        );
        let mut r = records(&text);
        assert_eq!(
            r.next_entry().unwrap().unwrap(),
            Err(IncompleteRecord {
                sequence_index: 0,
                compound_name: Some("LIG0".to_string()),
                line: 1,
                kind: MalformedRecordKind::MissingEnergy,
            })
        );
        let missing_name = r.next_entry().unwrap().unwrap().unwrap_err();
        assert_eq!(missing_name.kind, MalformedRecordKind::MissingName);
        assert_eq!(missing_name.sequence_index, 1);
        let complete = r.next_entry().unwrap().unwrap().unwrap();
        assert_eq!(complete.sequence_index, 2);
        assert!(r.next_entry().unwrap().is_none());
    }

    #[test]
    fn extract_records_copies_selected_records_verbatim() {
        let first = pose("LIG1", -5.0);
        let second = pose("LIG1", -6.0);
        let third = pose("LIG2", -1.0);
        let text = format!("preamble\n{first}{second}{third}");

        let mut out = Vec::new();
        let reader = RecordReader::new(Cursor::new(text.into_bytes()), ContainerFormat::default());
        let written = extract_records(reader, &BTreeSet::from([0, 2]), &mut out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{first}{third}"));
    }

    #[test]
    fn extract_records_with_empty_selection_writes_nothing() {
        let mut out = Vec::new();
        let reader = RecordReader::new(
            Cursor::new(pose("LIG1", 0.0).into_bytes()),
            ContainerFormat::default(),
        );
        assert_eq!(extract_records(reader, &BTreeSet::new(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
