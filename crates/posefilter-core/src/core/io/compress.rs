//! Transparent gzip handling for container streams.

use flate2::Compression;
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffered input stream over a file that may or may not be gzip-compressed.
pub type InputStream = BufReader<MaybeGzReader<BufReader<File>>>;

/// Checks the file extension for `.gz`.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Reader that transparently handles gzip compression.
pub enum MaybeGzReader<R: BufRead> {
    Plain(R),
    Gzip(MultiGzDecoder<R>),
}

impl<R: BufRead> MaybeGzReader<R> {
    /// Sniffs the gzip magic bytes without consuming them.
    pub fn detect(mut reader: R) -> io::Result<Self> {
        let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        Ok(if is_gzip {
            MaybeGzReader::Gzip(MultiGzDecoder::new(reader))
        } else {
            MaybeGzReader::Plain(reader)
        })
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, MaybeGzReader::Gzip(_))
    }
}

impl<R: BufRead> Read for MaybeGzReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            MaybeGzReader::Plain(r) => r.read(buf),
            MaybeGzReader::Gzip(r) => r.read(buf),
        }
    }
}

/// Writer that optionally gzip-compresses its output.
pub enum MaybeGzWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Write for MaybeGzWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            MaybeGzWriter::Plain(w) => w.write(buf),
            MaybeGzWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            MaybeGzWriter::Plain(w) => w.flush(),
            MaybeGzWriter::Gzip(w) => w.flush(),
        }
    }
}

impl<W: Write> MaybeGzWriter<W> {
    /// Writes the gzip trailer (if any) and returns the underlying writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            MaybeGzWriter::Plain(mut w) => {
                w.flush()?;
                Ok(w)
            }
            MaybeGzWriter::Gzip(w) => {
                let mut inner = w.finish()?;
                inner.flush()?;
                Ok(inner)
            }
        }
    }
}

/// Opens a file for buffered reading, detecting gzip compression from its content.
pub fn open_input(path: &Path) -> io::Result<InputStream> {
    let file = File::open(path)?;
    let inner = MaybeGzReader::detect(BufReader::new(file))?;
    Ok(BufReader::new(inner))
}

/// Creates a file for buffered writing, gzip-compressed when the path ends in `.gz`.
pub fn create_output(path: &Path) -> io::Result<MaybeGzWriter<BufWriter<File>>> {
    let writer = BufWriter::new(File::create(path)?);
    if is_gzip_path(path) {
        Ok(MaybeGzWriter::Gzip(GzEncoder::new(
            writer,
            Compression::default(),
        )))
    } else {
        Ok(MaybeGzWriter::Plain(writer))
    }
}
