use std::fs::File;
use std::io::{BufWriter, Write};

use flate2::{write::GzEncoder, Compression};
use memchr::{memrchr, memrchr2};
use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::record::FastqRecord;
use crate::sorter::Destination;

pub const FILEMOD_MATCH: &str = "__MATCH";
pub const FILEMOD_PARTIAL: &str = "__PARTIAL";
pub const FILEMOD_ABSENT: &str = "__ABSENT";

/// The six output files, one read-1/read-2 pair per [`Destination`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub match_r1: String,
    pub match_r2: String,
    pub partial_r1: String,
    pub partial_r2: String,
    pub absent_r1: String,
    pub absent_r2: String,
}

impl OutputPaths {
    /// Derive output paths by inserting a category token before each input's extension.
    pub fn from_inputs(input_r1: impl AsRef<str>, input_r2: impl AsRef<str>) -> Self {
        let [match_r1, partial_r1, absent_r1] = modified_paths(input_r1.as_ref());
        let [match_r2, partial_r2, absent_r2] = modified_paths(input_r2.as_ref());

        Self {
            match_r1,
            match_r2,
            partial_r1,
            partial_r2,
            absent_r1,
            absent_r2,
        }
    }

    /// Build from exactly six paths ordered match, partial, absent with read 1 before read 2.
    pub fn from_paths<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Result<Self> {
        let paths = paths.into_iter().map(Into::into).collect::<Vec<String>>();
        let Ok([match_r1, match_r2, partial_r1, partial_r2, absent_r1, absent_r2]) =
            <[String; 6]>::try_from(paths)
        else {
            return Err(Error::MalformedArguments(
                "please specify exactly 6 output file paths".to_owned(),
            ));
        };

        Ok(Self {
            match_r1,
            match_r2,
            partial_r1,
            partial_r2,
            absent_r1,
            absent_r2,
        })
    }

    pub fn pair(&self, dest: Destination) -> (&str, &str) {
        match dest {
            Destination::Match => (&self.match_r1, &self.match_r2),
            Destination::Partial => (&self.partial_r1, &self.partial_r2),
            Destination::Absent => (&self.absent_r1, &self.absent_r2),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        Destination::ALL
            .into_iter()
            .flat_map(move |d| {
                let (r1, r2) = self.pair(d);
                [r1, r2]
            })
    }
}

/// Index of the `.` that starts the file extension, ignoring dots in directory names.
fn extension_index(path: &str) -> Option<usize> {
    let b = path.as_bytes();
    let period = memrchr(b'.', b)?;

    match memrchr2(b'/', b'\\', b) {
        Some(slash) if slash > period => None,
        _ => Some(period),
    }
}

fn modified_paths(path: &str) -> [String; 3] {
    let (stem, ext) = match extension_index(path) {
        Some(i) => path.split_at(i),
        None => (path, ""),
    };

    [FILEMOD_MATCH, FILEMOD_PARTIAL, FILEMOD_ABSENT].map(|token| format!("{stem}{token}{ext}"))
}

enum WriterKind {
    Plain(BufWriter<File>),
    Gzip(BufWriter<GzEncoder<File>>),
}

/// A FASTQ output file, compressed when the path ends in `.gz`.
///
/// Dropping the writer flushes it; [`OutputWriter::finish`] does the same but reports errors.
pub struct OutputWriter {
    file: String,
    inner: WriterKind,
}

impl OutputWriter {
    pub fn create(file: impl AsRef<str>) -> Result<Self> {
        let file_path = file.as_ref();
        let not_writable = |e: std::io::Error| Error::OutputNotWritable {
            file: file_path.to_owned(),
            source: Box::new(e),
        };

        if let Some(parent) = std::path::Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(not_writable)?;
            }
        }

        let f = File::create(file_path).map_err(not_writable)?;
        let inner = if file_path.ends_with(".gz") {
            WriterKind::Gzip(BufWriter::new(GzEncoder::new(f, Compression::default())))
        } else {
            WriterKind::Plain(BufWriter::new(f))
        };

        Ok(Self {
            file: file_path.to_owned(),
            inner,
        })
    }

    pub fn finish(self) -> Result<()> {
        let file = self.file;
        let io_err = |e: std::io::Error| Error::FileIo {
            file: file.clone(),
            source: Box::new(e),
        };

        match self.inner {
            WriterKind::Plain(mut w) => w.flush().map_err(io_err),
            WriterKind::Gzip(w) => {
                let encoder = w.into_inner().map_err(|e| io_err(e.into_error()))?;
                encoder.finish().map(|_| ()).map_err(io_err)
            }
        }
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WriterKind::Plain(w) => w.write(buf),
            WriterKind::Gzip(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match &mut self.inner {
            WriterKind::Plain(w) => w.write_all(buf),
            WriterKind::Gzip(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            WriterKind::Plain(w) => w.flush(),
            WriterKind::Gzip(w) => w.flush(),
        }
    }
}

/// Writers for the read 1 and read 2 halves of a pair.
pub struct WriterPair<W: Write> {
    pub r1: W,
    pub r2: W,
}

impl<W: Write> WriterPair<W> {
    pub fn new(r1: W, r2: W) -> Self {
        Self { r1, r2 }
    }

    pub fn write_pair(&mut self, r1: &FastqRecord, r2: &FastqRecord) -> std::io::Result<()> {
        r1.write_to(&mut self.r1)?;
        r2.write_to(&mut self.r2)
    }
}

/// One writer pair for each [`Destination`].
pub struct SortOutputs<W: Write> {
    matched: WriterPair<W>,
    partial: WriterPair<W>,
    absent: WriterPair<W>,
}

impl<W: Write> SortOutputs<W> {
    pub fn new(matched: WriterPair<W>, partial: WriterPair<W>, absent: WriterPair<W>) -> Self {
        Self {
            matched,
            partial,
            absent,
        }
    }

    pub fn pair_mut(&mut self, dest: Destination) -> &mut WriterPair<W> {
        match dest {
            Destination::Match => &mut self.matched,
            Destination::Partial => &mut self.partial,
            Destination::Absent => &mut self.absent,
        }
    }

    pub fn into_pairs(self) -> [WriterPair<W>; 3] {
        [self.matched, self.partial, self.absent]
    }
}

impl SortOutputs<OutputWriter> {
    /// Create all six output files up front.
    pub fn create(paths: &OutputPaths) -> Result<Self> {
        let pair = |dest| -> Result<WriterPair<OutputWriter>> {
            let (r1, r2) = paths.pair(dest);
            Ok(WriterPair::new(OutputWriter::create(r1)?, OutputWriter::create(r2)?))
        };

        Ok(Self::new(
            pair(Destination::Match)?,
            pair(Destination::Partial)?,
            pair(Destination::Absent)?,
        ))
    }

    /// Flush and close every file, returning the first error.
    pub fn finish(self) -> Result<()> {
        let mut res = Ok(());

        for WriterPair { r1, r2 } in self.into_pairs() {
            for w in [r1, r2] {
                let finished = w.finish();
                if res.is_ok() {
                    res = finished;
                }
            }
        }

        res
    }
}
