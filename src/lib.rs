//! Sorting paired-end sequencing reads by a barcode on read 2.
//!
//! # Overview
//! r2sort reads two FASTQ files in lockstep (read 1 and read 2 of each pair) and looks for a
//! known barcode at the start of read 2. Each pair is written to one of three output pairs:
//! * **match**: at most `threshold_match` barcode mismatches
//! * **partial**: at most `threshold_partial` barcode mismatches
//! * **absent**: everything else
//!
//! Pairs where both reads start with ten `N`s are counted as unreadable and dropped.
//!
//! ## Ambiguity codes
//! Barcodes and reads may contain any IUPAC nucleotide code. Two symbols mismatch only when
//! the sets of bases they stand for are disjoint, so `N` matches anything and `R` matches `A`
//! and `G`. See [`iupac`] and [`matching`].
//!
//! ## Trimming
//! For matched and partial pairs, the barcode is cut from the start of read 2, and the reverse
//! complement of the barcode is cut from the end of read 1 when it (or a prefix of it) appears
//! there. Both cuts can be turned off with [`TrimFlags`].
//!
//! ## Example
//! ```no_run
//! use r2sort::{run, SortConfig};
//!
//! let config = SortConfig::new("reads_r1.fq.gz", "reads_r2.fq.gz", "CGTGAT")
//!     .with_thresholds(0, 1);
//! let counts = run(&config).unwrap();
//! print!("{}", counts.report());
//! ```
//!
//! With no explicit outputs, files are named after the inputs, for example
//! `reads_r1.fq__MATCH.gz`.

pub mod cli;
pub mod config;
pub mod errors;
pub mod iupac;
pub mod matching;
pub mod metrics;
pub mod outputs;
pub mod record;
pub mod sorter;

// commonly used functions and types

pub use crate::config::{SortConfig, Thresholds, TrimFlags, WritePolicy};
pub use crate::errors::{Error, Result};
pub use crate::metrics::SortCounts;
pub use crate::outputs::{OutputPaths, SortOutputs, WriterPair};
pub use crate::record::FastqRecord;
pub use crate::sorter::{run, Classification, Destination, ReadPairSorter};
