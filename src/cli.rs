//! Command line front end for the `r2sort` binary.

use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;

use clap::error::ErrorKind;
use clap::Parser;
use colored::*;
use log::info;

use crate::config::{check_output, parse_bool, parse_threshold, SortConfig, WritePolicy};
use crate::errors::*;
use crate::outputs::OutputPaths;
use crate::sorter;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "r2sort",
    version,
    about = "Sort paired-end FASTQ files by the presence of a barcode at the start of read 2",
    long_about = "Sort paired-end FASTQ files by the presence of a barcode at the start of read 2.\n\n\
                  Pairs are written to match, partial and absent outputs according to the number \
                  of barcode mismatches. Pairs whose reads both start with 10 Ns are counted and \
                  dropped. IUPAC ambiguity codes are allowed in the barcode and the reads."
)]
pub struct Args {
    /// Read 1 FASTQ file (.gz for gzip)
    pub input_r1: String,

    /// Read 2 FASTQ file (.gz for gzip)
    pub input_r2: String,

    /// Barcode expected at the start of read 2 (IUPAC symbols)
    pub barcode: String,

    /// Output files: match r1, match r2, partial r1, partial r2, absent r1, absent r2
    #[arg(
        short = 'o',
        long = "outputs",
        num_args = 6,
        value_names = ["MATCH_R1", "MATCH_R2", "PARTIAL_R1", "PARTIAL_R2", "ABSENT_R1", "ABSENT_R2"]
    )]
    pub outputs: Option<Vec<String>>,

    /// Maximum barcode mismatches for a match and for a partial match [default: 0 0]
    #[arg(
        short = 't',
        long = "thresholds",
        num_args = 2,
        allow_negative_numbers = true,
        value_names = ["MATCH", "PARTIAL"]
    )]
    pub thresholds: Option<Vec<String>>,

    /// Whether to remove barcode sequence from read 2 and from read 1 (y/n) [default: y y]
    #[arg(
        short = 'r',
        long = "remove",
        short_alias = 'a',
        num_args = 2,
        value_names = ["REMOVE_R2", "REMOVE_R1"]
    )]
    pub remove: Option<Vec<String>>,

    /// Fail instead of overwriting existing output files
    #[arg(long = "no-overwrite", conflicts_with = "force")]
    pub no_overwrite: bool,

    /// Overwrite existing output files without asking
    #[arg(long = "force")]
    pub force: bool,

    /// Also write the pair counts to this YAML file (subject to the same overwrite checks)
    #[arg(long = "metrics-yaml", value_name = "PATH")]
    pub metrics_yaml: Option<String>,

    /// Do not print the metrics report
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Log more detail (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn write_policy(&self) -> WritePolicy {
        if self.force {
            WritePolicy::Overwrite
        } else if self.no_overwrite {
            WritePolicy::Forbid
        } else {
            WritePolicy::Confirm
        }
    }

    pub fn to_config(&self) -> Result<SortConfig> {
        let mut config = SortConfig::new(&self.input_r1, &self.input_r2, &self.barcode)
            .with_write_policy(self.write_policy());

        if let Some(outputs) = &self.outputs {
            config = config.with_outputs(OutputPaths::from_paths(outputs.iter().cloned())?);
        }

        if let Some(thresholds) = &self.thresholds {
            let [matched, partial] = two_values(thresholds, "-t")?;
            config = config.with_thresholds(parse_threshold(matched)?, parse_threshold(partial)?);
        }

        if let Some(remove) = &self.remove {
            let [r2, r1] = two_values(remove, "-r")?;
            config = config.with_trim(parse_bool(r1)?, parse_bool(r2)?);
        }

        Ok(config)
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, 0) => "warn",
            (false, 0) => "info",
            (_, 1) => "debug",
            _ => "trace",
        }
    }
}

fn two_values<'a>(values: &'a [String], flag: &str) -> Result<[&'a str; 2]> {
    match values {
        [a, b] => Ok([a.as_str(), b.as_str()]),
        _ => Err(Error::MalformedArguments(format!(
            "please specify exactly 2 values for {flag}"
        ))),
    }
}

/// Run the sorter on a validated set of arguments.
pub fn run(args: &Args) -> Result<()> {
    let config = args.to_config()?;
    config.validate()?;

    if let Some(file) = &args.metrics_yaml {
        let stdin = std::io::stdin();
        check_output(file, config.write_policy, &mut stdin.lock(), &mut std::io::stdout())?;
    }

    let counts = sorter::run(&config)?;

    if !args.quiet {
        print!("{}", counts.report());
    }

    if let Some(file) = &args.metrics_yaml {
        let f = File::create(file).map_err(|e| Error::FileIo {
            file: file.clone(),
            source: Box::new(e),
        })?;
        counts.write_yaml(BufWriter::new(f))?;
        info!("Wrote metrics to \"{file}\"");
    }

    Ok(())
}

/// Parse command line arguments, run, and return the process exit code.
pub fn run_from_args<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = e.print();
                    EXIT_SUCCESS
                }
                _ => report_error(&Error::MalformedArguments(e.to_string().trim().to_owned())),
            };
        }
    };

    // a logger may already be installed when running in-process
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .try_init();

    match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn report_error(e: &Error) -> u8 {
    if e.is_benign() {
        eprintln!("{e}");
        EXIT_SUCCESS
    } else {
        eprintln!("{} {e}", "ERROR:".red().bold());
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Thresholds, TrimFlags};

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("r2sort").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let args = parse(&["a_r1.fq", "a_r2.fq", "CGTGAT"]).unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.trim, TrimFlags::default());
        assert_eq!(config.write_policy, WritePolicy::Confirm);
        assert_eq!(config.output_paths().absent_r2, "a_r2__ABSENT.fq");
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn remove_flags_are_read2_then_read1() {
        let args = parse(&["a", "b", "ACGT", "-r", "yes", "n", "-t", "1", "3"]).unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.trim, TrimFlags { read1: false, read2: true });
        assert_eq!(config.thresholds, Thresholds { matched: 1, partial: 3 });

        let args = parse(&["a", "b", "ACGT", "-a", "F", "True"]).unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.trim, TrimFlags { read1: true, read2: false });
    }

    #[test]
    fn explicit_outputs() {
        let args = parse(&["-o", "1", "2", "3", "4", "5", "6", "a", "b", "ACGT"]).unwrap();
        let config = args.to_config().unwrap();
        let outputs = config.output_paths();
        assert_eq!(outputs.match_r1, "1");
        assert_eq!(outputs.absent_r2, "6");
        assert_eq!(args.input_r1, "a");
    }

    #[test]
    fn bad_values() {
        let args = parse(&["a", "b", "ACGT", "-t", "0", "x"]).unwrap();
        assert!(matches!(args.to_config(), Err(Error::InvalidThreshold(_))));

        let args = parse(&["a", "b", "ACGT", "-t", "0", "-1"]).unwrap();
        assert!(matches!(args.to_config(), Err(Error::InvalidThreshold(_))));

        let args = parse(&["a", "b", "ACGT", "-r", "maybe", "y"]).unwrap();
        assert!(matches!(args.to_config(), Err(Error::InvalidBoolean(_))));

        assert!(parse(&["a", "b", "ACGT", "-o", "1", "2", "3"]).is_err());
        assert!(parse(&["a", "b", "ACGT", "--force", "--no-overwrite"]).is_err());
    }

    #[test]
    fn write_policy_flags() {
        let args = parse(&["a", "b", "ACGT", "--force"]).unwrap();
        assert_eq!(args.write_policy(), WritePolicy::Overwrite);
        let args = parse(&["a", "b", "ACGT", "--no-overwrite", "-q"]).unwrap();
        assert_eq!(args.write_policy(), WritePolicy::Forbid);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(run_from_args(["r2sort", "--help"]), EXIT_SUCCESS);
        assert_eq!(run_from_args(["r2sort", "--version"]), EXIT_SUCCESS);
        assert_eq!(run_from_args(["r2sort", "a"]), EXIT_FAILURE);
        assert_eq!(
            run_from_args(["r2sort", "/nonexistent/a.fq", "/nonexistent/b.fq", "ACGT"]),
            EXIT_FAILURE
        );
    }
}
