//! Sorting read pairs by the presence of a barcode at the start of read 2.
//!
//! Each pair is classified as one of:
//! * **Unreadable**: both reads start with [`N_SPAM_CUTOFF`] `N`s. The pair is counted and
//!   dropped.
//! * **Match**: the barcode mismatches are within the match threshold.
//! * **Partial**: the mismatches are within the partial threshold.
//! * **Absent**: anything else.
//!
//! Matched and partial pairs can have the barcode removed from read 2 (a fixed-length cut)
//! and any trailing reverse complement of the barcode removed from read 1.

use std::io::{BufRead, Write};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{SortConfig, Thresholds, TrimFlags};
use crate::errors::*;
use crate::iupac::{reverse_complement, validate_barcode};
use crate::matching::{candidate_trim_position, count_prefix_mismatches};
use crate::metrics::SortCounts;
use crate::outputs::{OutputPaths, SortOutputs};
use crate::record::{open_input, FastqRecord};

/// Number of leading symbols checked when deciding whether a pair is unreadable.
pub const N_SPAM_CUTOFF: usize = 10;
pub const UNREADABLE_SYMBOL: u8 = b'N';

/// Which pair of output streams a read pair goes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    Match,
    Partial,
    Absent,
}

impl Destination {
    pub const ALL: [Destination; 3] = [Destination::Match, Destination::Partial, Destination::Absent];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Unreadable,
    Match,
    Partial,
    Absent,
}

impl Classification {
    /// Where the pair is written. Unreadable pairs are not written.
    pub fn destination(self) -> Option<Destination> {
        match self {
            Classification::Unreadable => None,
            Classification::Match => Some(Destination::Match),
            Classification::Partial => Some(Destination::Partial),
            Classification::Absent => Some(Destination::Absent),
        }
    }
}

/// File names used to give I/O errors context.
struct StreamNames<'a> {
    inputs: [&'a str; 2],
    outputs: &'a OutputPaths,
}

pub struct ReadPairSorter {
    barcode: Vec<u8>,
    tail_pattern: Vec<u8>,
    thresholds: Thresholds,
    trim: TrimFlags,
}

impl ReadPairSorter {
    const NAME: &'static str = "ReadPairSorter";

    pub fn new(config: &SortConfig) -> Result<Self> {
        Self::from_parts(config.barcode.as_bytes(), config.thresholds, config.trim)
    }

    pub fn from_parts(
        barcode: impl AsRef<[u8]>,
        thresholds: Thresholds,
        trim: TrimFlags,
    ) -> Result<Self> {
        let barcode = barcode.as_ref();
        validate_barcode(barcode)?;
        // validated above, so every symbol has a complement
        let tail_pattern = reverse_complement(barcode).unwrap_or_default();

        debug!(
            "{}: barcode {}, read 1 tail pattern {}, thresholds {:?}, trim {:?}",
            Self::NAME,
            utf8(barcode),
            utf8(&tail_pattern),
            thresholds,
            trim
        );

        Ok(Self {
            barcode: barcode.to_owned(),
            tail_pattern,
            thresholds,
            trim,
        })
    }

    /// The reverse complement of the barcode, searched for at the end of read 1.
    pub fn tail_pattern(&self) -> &[u8] {
        &self.tail_pattern
    }

    /// Whether both reads begin with [`N_SPAM_CUTOFF`] unreadable symbols.
    pub fn is_unreadable(r1: &FastqRecord, r2: &FastqRecord) -> bool {
        let spam = |seq: &[u8]| {
            seq.len() >= N_SPAM_CUTOFF
                && seq[..N_SPAM_CUTOFF].iter().all(|&c| c == UNREADABLE_SYMBOL)
        };

        spam(&r1.seq) && spam(&r2.seq)
    }

    pub fn classify(&self, r1: &FastqRecord, r2: &FastqRecord) -> Classification {
        if Self::is_unreadable(r1, r2) {
            return Classification::Unreadable;
        }

        let mismatches = count_prefix_mismatches(&self.barcode, &r2.seq);

        if mismatches <= self.thresholds.matched {
            Classification::Match
        } else if mismatches <= self.thresholds.partial {
            Classification::Partial
        } else {
            Classification::Absent
        }
    }

    /// Classify a pair and trim barcode sequence from it if it matched or partially matched.
    pub fn process_pair(&self, r1: &mut FastqRecord, r2: &mut FastqRecord) -> Classification {
        let class = self.classify(r1, r2);

        let threshold = match class {
            Classification::Match => self.thresholds.matched,
            Classification::Partial => self.thresholds.partial,
            Classification::Unreadable | Classification::Absent => return class,
        };

        if self.trim.read1 {
            let pos = candidate_trim_position(&r1.seq, &self.tail_pattern, threshold);
            r1.truncate(pos);
        }

        if self.trim.read2 {
            r2.trim_front(self.barcode.len());
        }

        class
    }

    /// Sort every pair from two streams into the output writers.
    ///
    /// Stops at the first pair where either stream is exhausted.
    pub fn sort<R1, R2, W>(
        &self,
        in1: &mut R1,
        in2: &mut R2,
        outputs: &mut SortOutputs<W>,
    ) -> Result<SortCounts>
    where
        R1: BufRead + ?Sized,
        R2: BufRead + ?Sized,
        W: Write,
    {
        self.sort_streams(in1, in2, outputs, None)
    }

    fn sort_streams<R1, R2, W>(
        &self,
        in1: &mut R1,
        in2: &mut R2,
        outputs: &mut SortOutputs<W>,
        names: Option<&StreamNames>,
    ) -> Result<SortCounts>
    where
        R1: BufRead + ?Sized,
        R2: BufRead + ?Sized,
        W: Write,
    {
        let io_err = |file: Option<&str>, e: std::io::Error| match file {
            Some(file) => Error::FileIo {
                file: file.to_owned(),
                source: Box::new(e),
            },
            None => Error::BytesIo(Box::new(e)),
        };
        let input_name = |i: usize| names.map(|n| n.inputs[i]);
        let output_name = |dest: Destination, i: usize| {
            names.map(|n| {
                let (r1, r2) = n.outputs.pair(dest);
                if i == 0 {
                    r1
                } else {
                    r2
                }
            })
        };

        let mut counts = SortCounts::default();

        loop {
            let rec1 = FastqRecord::read_from(in1).map_err(|e| io_err(input_name(0), e))?;
            let rec2 = FastqRecord::read_from(in2).map_err(|e| io_err(input_name(1), e))?;

            let (mut r1, mut r2) = match (rec1, rec2) {
                (Some(r1), Some(r2)) => (r1, r2),
                (None, None) => break,
                (Some(_), None) | (None, Some(_)) => {
                    warn!(
                        "Input streams have different numbers of records, stopping after {} pairs",
                        counts.total
                    );
                    break;
                }
            };

            let class = self.process_pair(&mut r1, &mut r2);
            counts.record(class);

            if let Some(dest) = class.destination() {
                let pair = outputs.pair_mut(dest);
                r1.write_to(&mut pair.r1)
                    .map_err(|e| io_err(output_name(dest, 0), e))?;
                r2.write_to(&mut pair.r2)
                    .map_err(|e| io_err(output_name(dest, 1), e))?;
            }
        }

        Ok(counts)
    }
}

/// Sort the files described by `config`.
///
/// All input and output files are opened before any read is processed and are closed when
/// this returns, whether or not it succeeds.
pub fn run(config: &SortConfig) -> Result<SortCounts> {
    let sorter = ReadPairSorter::new(config)?;
    let paths = config.output_paths();

    let mut in1 = open_input(&config.input_r1)?;
    let mut in2 = open_input(&config.input_r2)?;
    let mut outputs = SortOutputs::create(&paths)?;

    info!(
        "Sorting \"{}\" and \"{}\" by read 2 barcode {}",
        config.input_r1, config.input_r2, config.barcode
    );
    for dest in Destination::ALL {
        let (r1, r2) = paths.pair(dest);
        info!("{dest:?} pairs: \"{r1}\", \"{r2}\"");
    }

    let names = StreamNames {
        inputs: [config.input_r1.as_str(), config.input_r2.as_str()],
        outputs: &paths,
    };
    let counts = sorter.sort_streams(&mut in1, &mut in2, &mut outputs, Some(&names))?;
    outputs.finish()?;

    info!("Sorting finished: {} pairs", counts.total);
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::WriterPair;

    fn sorter(barcode: &str, matched: usize, partial: usize) -> ReadPairSorter {
        ReadPairSorter::from_parts(
            barcode,
            Thresholds { matched, partial },
            TrimFlags { read1: true, read2: true },
        )
        .unwrap()
    }

    fn rec(seq: &str) -> FastqRecord {
        FastqRecord::new("@r", seq, "+", "I".repeat(seq.len()))
    }

    #[test]
    fn full_match_trims_read2() {
        let s = sorter("CGTG", 0, 0);
        let mut r1 = rec("TTTTTTTTTTTT");
        let mut r2 = rec("CGTGAAAAAAAA");

        assert_eq!(s.process_pair(&mut r1, &mut r2), Classification::Match);
        assert_eq!(r2.seq, b"AAAAAAAA");
        assert_eq!(r2.qual.len(), 8);
        assert_eq!(r1.seq, b"TTTTTTTTTTTT");
    }

    #[test]
    fn one_mismatch_is_partial() {
        let s = sorter("CGTG", 0, 1);
        let r1 = rec("TTTTTTTTTTTT");
        let r2 = rec("CGTAAAAAAAAA");
        assert_eq!(s.classify(&r1, &r2), Classification::Partial);
    }

    #[test]
    fn absent_is_never_trimmed() {
        let s = sorter("CGTG", 0, 1);
        let mut r1 = rec("GGGGGGGGCACG");
        let mut r2 = rec("CCCCAAAAAAAA");

        assert_eq!(s.process_pair(&mut r1, &mut r2), Classification::Absent);
        assert_eq!(r1.seq, b"GGGGGGGGCACG");
        assert_eq!(r2.seq, b"CCCCAAAAAAAA");
    }

    #[test]
    fn leading_ns_on_both_reads_are_unreadable() {
        let s = sorter("NNNN", 0, 0);
        let r1 = rec("NNNNNNNNNNACGT");
        let r2 = rec("NNNNNNNNNNACGT");
        assert_eq!(s.classify(&r1, &r2), Classification::Unreadable);

        let r1 = rec("NNNNNNNNNAACGT");
        assert_eq!(s.classify(&r1, &r2), Classification::Match);

        let short = rec("NNNNN");
        assert_eq!(s.classify(&short, &short), Classification::Match);
    }

    #[test]
    fn read1_tail_trim_uses_reverse_complement() {
        let s = sorter("CGTGAT", 0, 0);
        assert_eq!(s.tail_pattern(), b"ATCACG");

        let mut r1 = rec("GGGGGGGGATCACGTT");
        let mut r2 = rec("CGTGATCCCCCCCCCC");
        assert_eq!(s.process_pair(&mut r1, &mut r2), Classification::Match);
        assert_eq!(r1.seq, b"GGGGGGGGATCACGTT");

        let mut r1 = rec("GGGGGGGGATCACG");
        let mut r2 = rec("CGTGATCCCCCCCCCC");
        s.process_pair(&mut r1, &mut r2);
        assert_eq!(r1.seq, b"GGGGGGGG");
        assert_eq!(r1.qual, b"IIIIIIII");

        let mut r1 = rec("GGGGGGGGGGGATC");
        let mut r2 = rec("CGTGATCCCCCCCCCC");
        s.process_pair(&mut r1, &mut r2);
        assert_eq!(r1.seq, b"GGGGGGGGGGG");
    }

    #[test]
    fn partial_branch_uses_partial_threshold() {
        let s = sorter("CGTGAT", 0, 1);
        let mut r1 = rec("GGGGGGGGATCACC");
        let mut r2 = rec("CGTGAACCCCCCCCCC");
        assert_eq!(s.process_pair(&mut r1, &mut r2), Classification::Partial);
        assert_eq!(r1.seq, b"GGGGGGGG");
        assert_eq!(r2.seq, b"CCCCCCCCCC");
    }

    #[test]
    fn trim_flags_are_independent() {
        let s = ReadPairSorter::from_parts(
            "CGTGAT",
            Thresholds::default(),
            TrimFlags { read1: false, read2: true },
        )
        .unwrap();
        let mut r1 = rec("GGGGGGGGATCACG");
        let mut r2 = rec("CGTGATCC");
        s.process_pair(&mut r1, &mut r2);
        assert_eq!(r1.seq, b"GGGGGGGGATCACG");
        assert_eq!(r2.seq, b"CC");
    }

    #[test]
    fn short_read2_counts_missing_positions() {
        let s = sorter("CGTGAT", 1, 2);
        let r1 = rec("AAAAAAAAAA");
        assert_eq!(s.classify(&r1, &rec("CGTGA")), Classification::Match);
        assert_eq!(s.classify(&r1, &rec("CGTG")), Classification::Partial);
        assert_eq!(s.classify(&r1, &rec("CGT")), Classification::Absent);
    }

    #[test]
    fn invalid_barcode_is_rejected() {
        assert!(matches!(
            ReadPairSorter::from_parts("CGXG", Thresholds::default(), TrimFlags::default()),
            Err(Error::InvalidBarcode { .. })
        ));
    }

    #[test]
    fn sort_routes_and_counts() {
        let s = sorter("CGTG", 0, 1);
        let fq = |recs: &[(&str, &str)]| {
            recs.iter()
                .flat_map(|(id, seq)| {
                    FastqRecord::new(*id, *seq, "+", "I".repeat(seq.len())).to_bytes()
                })
                .collect::<Vec<u8>>()
        };
        let in1 = fq(&[
            ("@p1/1", "AAAAAAAAAAAA"),
            ("@p2/1", "AAAAAAAAAAAA"),
            ("@p3/1", "AAAAAAAAAAAA"),
            ("@p4/1", "NNNNNNNNNNNN"),
            ("@p5/1", "AAAAAAAAAAAA"),
        ]);
        let in2 = fq(&[
            ("@p1/2", "CGTGAAAA"),
            ("@p2/2", "CGTAAAAA"),
            ("@p3/2", "CCCCAAAA"),
            ("@p4/2", "NNNNNNNNNNNN"),
        ]);

        let pair = || WriterPair::new(Vec::<u8>::new(), Vec::new());
        let mut outputs = SortOutputs::new(pair(), pair(), pair());
        let counts = s.sort(&mut &in1[..], &mut &in2[..], &mut outputs).unwrap();

        assert_eq!(counts.total, 4);
        assert_eq!(counts.matched, 1);
        assert_eq!(counts.partial, 1);
        assert_eq!(counts.absent, 1);
        assert_eq!(counts.unreadable, 1);

        let [matched, partial, absent] = outputs.into_pairs();
        assert_eq!(matched.r2, b"@p1/2\nAAAA\n+\nIIII\n");
        assert_eq!(partial.r2, b"@p2/2\nAAAA\n+\nIIII\n");
        assert_eq!(absent.r2, b"@p3/2\nCCCCAAAA\n+\nIIIIIIII\n");
        assert_eq!(matched.r1, b"@p1/1\nAAAAAAAAAAAA\n+\nIIIIIIIIIIII\n");
    }
}
