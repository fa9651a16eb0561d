use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use flate2::read::MultiGzDecoder;

use crate::errors::*;

/// One four-line FASTQ record.
///
/// The placeholder (`+`) line is passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FastqRecord {
    pub id: Vec<u8>,
    pub seq: Vec<u8>,
    pub placeholder: Vec<u8>,
    pub qual: Vec<u8>,
}

impl FastqRecord {
    pub fn new(
        id: impl Into<Vec<u8>>,
        seq: impl Into<Vec<u8>>,
        placeholder: impl Into<Vec<u8>>,
        qual: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
            placeholder: placeholder.into(),
            qual: qual.into(),
        }
    }

    /// Read the next record, or `None` once the stream is exhausted.
    ///
    /// Exactly four lines are consumed. A record whose sequence line is missing or empty
    /// counts as exhausted.
    pub fn read_from<R: BufRead + ?Sized>(reader: &mut R) -> std::io::Result<Option<Self>> {
        let mut record = Self::default();

        read_line(reader, &mut record.id)?;
        read_line(reader, &mut record.seq)?;
        read_line(reader, &mut record.placeholder)?;
        read_line(reader, &mut record.qual)?;

        if record.seq.is_empty() {
            return Ok(None);
        }

        Ok(Some(record))
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.id)?;
        writer.write_all(b"\n")?;
        writer.write_all(&self.seq)?;
        writer.write_all(b"\n")?;
        writer.write_all(&self.placeholder)?;
        writer.write_all(b"\n")?;
        writer.write_all(&self.qual)?;
        writer.write_all(b"\n")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(
            self.id.len() + self.seq.len() + self.placeholder.len() + self.qual.len() + 4,
        );
        res.extend_from_slice(&self.id);
        res.push(b'\n');
        res.extend_from_slice(&self.seq);
        res.push(b'\n');
        res.extend_from_slice(&self.placeholder);
        res.push(b'\n');
        res.extend_from_slice(&self.qual);
        res.push(b'\n');
        res
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Keep only the first `pos` symbols of the sequence and quality lines.
    pub fn truncate(&mut self, pos: usize) {
        self.seq.truncate(pos);
        self.qual.truncate(pos);
    }

    /// Drop the first `n` symbols of the sequence and quality lines.
    pub fn trim_front(&mut self, n: usize) {
        self.seq.drain(..n.min(self.seq.len()));
        self.qual.drain(..n.min(self.qual.len()));
    }
}

fn read_line<R: BufRead + ?Sized>(reader: &mut R, line: &mut Vec<u8>) -> std::io::Result<usize> {
    let n = reader.read_until(b'\n', line)?;

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }

    Ok(n)
}

/// Open a FASTQ file for reading, decompressing it if the path ends in `.gz`.
pub fn open_input(file: impl AsRef<str>) -> Result<Box<dyn BufRead + Send>> {
    let file_path = file.as_ref();
    let f = File::open(file_path).map_err(|e| Error::InputNotReadable {
        file: file_path.to_owned(),
        source: Box::new(e),
    })?;

    if file_path.ends_with(".gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}
