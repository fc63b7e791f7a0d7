use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SonifyError {
    #[error("waveform slice is empty")]
    Empty,

    #[error("waveform slice contains only undefined samples")]
    AllUndefined,

    #[error("waveform slice is silent, nothing to normalize")]
    Silent,

    #[error("waveform slice too short to produce any audio samples")]
    TooShort,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
