pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Input file \"{file}\" does not exist or could not be opened: {source}")]
    InputNotReadable {
        file: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Invalid nucleotide barcode: \"{barcode}\" ({reason})")]
    InvalidBarcode {
        barcode: String,
        reason: String,
    },
    #[error("Unable to write to the specified output file \"{file}\": {source}")]
    OutputNotWritable {
        file: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Output file \"{file}\" already exists and overwriting is forbidden")]
    OverwriteForbidden { file: String },
    #[error("Declined to overwrite existing output file \"{file}\"")]
    OverwriteDeclined { file: String },
    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),
    #[error("Please specify a non-negative integer for the mismatch thresholds, got \"{0}\"")]
    InvalidThreshold(String),
    #[error("Please specify Yes/No, got \"{0}\"")]
    InvalidBoolean(String),
    #[error("Error reading or writing \"{file}\": {source}")]
    FileIo {
        file: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Error reading or writing bytes: {0}")]
    BytesIo(Box<dyn std::error::Error + Send + Sync>),
    #[error("Error parsing configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error ends the run without being a failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::OverwriteDeclined { .. })
    }
}

pub fn utf8(b: &[u8]) -> String {
    std::str::from_utf8(b).unwrap_or("invalid UTF-8").to_owned()
}
