use std::io::{BufRead, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::iupac::validate_barcode;
use crate::outputs::OutputPaths;

pub const DEFAULT_THRESHOLD_MATCH: usize = 0;
pub const DEFAULT_THRESHOLD_PARTIAL: usize = 0;
pub const DEFAULT_TRIM_R1: bool = true;
pub const DEFAULT_TRIM_R2: bool = true;

static YES: [&str; 4] = ["y", "yes", "t", "true"];
static NO: [&str; 4] = ["n", "no", "f", "false"];

/// Maximum number of barcode mismatches for a match and for a partial match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub matched: usize,
    pub partial: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            matched: DEFAULT_THRESHOLD_MATCH,
            partial: DEFAULT_THRESHOLD_PARTIAL,
        }
    }
}

/// Whether barcode sequence is removed from each read of matched and partial pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimFlags {
    pub read1: bool,
    pub read2: bool,
}

impl Default for TrimFlags {
    fn default() -> Self {
        Self {
            read1: DEFAULT_TRIM_R1,
            read2: DEFAULT_TRIM_R2,
        }
    }
}

/// What to do when an output file already exists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    Overwrite,
    #[default]
    Confirm,
    Forbid,
}

/// Everything needed for one sorting run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub input_r1: String,
    pub input_r2: String,
    pub barcode: String,
    /// Derived from the input paths when absent.
    #[serde(default)]
    pub outputs: Option<OutputPaths>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub trim: TrimFlags,
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl SortConfig {
    pub fn new(
        input_r1: impl Into<String>,
        input_r2: impl Into<String>,
        barcode: impl Into<String>,
    ) -> Self {
        Self {
            input_r1: input_r1.into(),
            input_r2: input_r2.into(),
            barcode: barcode.into(),
            outputs: None,
            thresholds: Thresholds::default(),
            trim: TrimFlags::default(),
            write_policy: WritePolicy::default(),
        }
    }

    /// Load a run description from YAML.
    pub fn from_yaml(reader: impl std::io::Read) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn with_outputs(mut self, outputs: OutputPaths) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn with_thresholds(mut self, matched: usize, partial: usize) -> Self {
        self.thresholds = Thresholds { matched, partial };
        self
    }

    pub fn with_trim(mut self, read1: bool, read2: bool) -> Self {
        self.trim = TrimFlags { read1, read2 };
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn output_paths(&self) -> OutputPaths {
        self.outputs
            .clone()
            .unwrap_or_else(|| OutputPaths::from_inputs(&self.input_r1, &self.input_r2))
    }

    /// Check inputs, barcode and outputs, asking on the terminal before overwriting files.
    pub fn validate(&self) -> Result<()> {
        let stdin = std::io::stdin();
        self.validate_with_prompt(&mut stdin.lock(), &mut std::io::stdout())
    }

    /// Like [`SortConfig::validate`], with the overwrite confirmation read from `input`.
    pub fn validate_with_prompt(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<()> {
        for file in [&self.input_r1, &self.input_r2] {
            std::fs::File::open(file).map_err(|e| Error::InputNotReadable {
                file: file.clone(),
                source: Box::new(e),
            })?;
        }

        validate_barcode(self.barcode.as_bytes())?;

        let outputs = self.output_paths();
        for file in outputs.iter() {
            check_output(file, self.write_policy, input, output)?;
        }

        debug!("Validated configuration: {:?}", self);
        Ok(())
    }
}

/// Check that `file` can be written under `policy`, asking through `input` and `output`
/// when the policy is [`WritePolicy::Confirm`] and the file exists.
pub fn check_output(
    file: &str,
    policy: WritePolicy,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    let path = Path::new(file);
    if !path.exists() {
        return Ok(());
    }

    if path.is_dir() {
        return Err(Error::OutputNotWritable {
            file: file.to_owned(),
            source: "path is a directory".into(),
        });
    }

    match policy {
        WritePolicy::Overwrite => Ok(()),
        WritePolicy::Forbid => Err(Error::OverwriteForbidden {
            file: file.to_owned(),
        }),
        WritePolicy::Confirm => {
            let io_err = |e: std::io::Error| Error::BytesIo(Box::new(e));

            write!(
                output,
                "\nFile already exists:\n\t{file}\nDo you wish to overwrite it? (y/n): "
            )
            .map_err(io_err)?;
            output.flush().map_err(io_err)?;

            let mut answer = String::new();
            if input.read_line(&mut answer).map_err(io_err)? == 0 {
                return Err(io_err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "no answer to the overwrite prompt",
                )));
            }

            if parse_bool(answer.trim()).unwrap_or(false) {
                Ok(())
            } else {
                Err(Error::OverwriteDeclined {
                    file: file.to_owned(),
                })
            }
        }
    }
}

/// Parse a non-negative mismatch threshold.
pub fn parse_threshold(s: &str) -> Result<usize> {
    s.trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidThreshold(s.to_owned()))
}

/// Parse a yes/no token (`y`, `yes`, `t`, `true` or `n`, `no`, `f`, `false`, any case).
pub fn parse_bool(s: &str) -> Result<bool> {
    let lower = s.trim().to_ascii_lowercase();

    if YES.contains(&lower.as_str()) {
        Ok(true)
    } else if NO.contains(&lower.as_str()) {
        Ok(false)
    } else {
        Err(Error::InvalidBoolean(s.to_owned()))
    }
}
