use super::container::ContainerFormat;
use std::io::{self, BufRead, Write};

/// Moves each pose's structural-block preamble to sit directly before its
/// fixed-format content.
///
/// Lines from the block-start marker up to (not including) the next delimiter line are
/// held back; they are written immediately before the next fixed-content marker line.
/// Every other line passes through in its original order, so the output is a
/// permutation of the input lines. A held-back span still pending at end of input is
/// written last.
///
/// Returns the number of lines written.
pub fn reorder_blocks<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    format: &ContainerFormat,
) -> io::Result<usize> {
    let mut pending = String::new();
    let mut pending_lines = 0usize;
    let mut holding = false;
    let mut written = 0usize;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        if line.starts_with(&format.block_start_marker) {
            holding = true;
        } else if line.starts_with(&format.delimiter) {
            holding = false;
        } else if line.starts_with(&format.fixed_content_marker) {
            writer.write_all(pending.as_bytes())?;
            written += pending_lines;
            pending.clear();
            pending_lines = 0;
        }

        if holding {
            pending.push_str(&line);
            pending_lines += 1;
        } else {
            writer.write_all(line.as_bytes())?;
            written += 1;
        }
    }

    if pending_lines > 0 {
        writer.write_all(pending.as_bytes())?;
        written += pending_lines;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    const MOLECULE_FIRST: &str = "\
@<TRIPOS>MOLECULE\n\
LIG1\n\
 12 12 0 0 0\n\
##########  Name: LIG1\n\
##########  Total Energy: -12.0\n\
\n\
@<TRIPOS>ATOM\n\
      1 C1  0.0 0.0 0.0 C.3\n\
@<TRIPOS>MOLECULE\n\
LIG2\n\
##########  Name: LIG2\n\
@<TRIPOS>ATOM\n\
      1 N1  1.0 0.0 0.0 N.3\n";

    fn run(input: &str) -> (String, usize) {
        let mut out = Vec::new();
        let n = reorder_blocks(
            &mut Cursor::new(input.as_bytes()),
            &mut out,
            &ContainerFormat::default(),
        )
        .unwrap();
        (String::from_utf8(out).unwrap(), n)
    }

    #[test]
    fn header_moves_ahead_of_structural_block() {
        let (out, n) = run(MOLECULE_FIRST);
        let expected = "\
##########  Name: LIG1\n\
##########  Total Energy: -12.0\n\
\n\
@<TRIPOS>MOLECULE\n\
LIG1\n\
 12 12 0 0 0\n\
@<TRIPOS>ATOM\n\
      1 C1  0.0 0.0 0.0 C.3\n\
##########  Name: LIG2\n\
@<TRIPOS>MOLECULE\n\
LIG2\n\
@<TRIPOS>ATOM\n\
      1 N1  1.0 0.0 0.0 N.3\n";
        assert_eq!(out, expected);
        assert_eq!(n, MOLECULE_FIRST.lines().count());
    }

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let (out, _) = run(MOLECULE_FIRST);
        let count = |s: &str| {
            let mut m: BTreeMap<String, usize> = BTreeMap::new();
            for l in s.lines() {
                *m.entry(l.to_string()).or_default() += 1;
            }
            m
        };
        assert_eq!(count(&out), count(MOLECULE_FIRST));
    }

    #[test]
    fn text_without_markers_passes_through_unchanged() {
        let input = "line one\nline two\n##########  Name: X\n";
        assert_eq!(run(input).0, input);
    }

    #[test]
    fn unterminated_structural_block_is_flushed_at_end() {
        let input = "@<TRIPOS>MOLECULE\nLIG\n";
        let (out, n) = run(input);
        assert_eq!(out, input);
        assert_eq!(n, 2);
    }
}
