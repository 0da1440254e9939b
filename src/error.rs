use thiserror::Error;

pub type SheetIoResult<T> = Result<T, SheetIoError>;

#[derive(Error, Debug)]
pub enum SheetIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot read spreadsheet: {0}")]
    UnreadableFile(String),

    #[error("Unmapped code '{code}' in column '{column}'")]
    UnmappedCode { column: String, code: String },

    #[error("Invalid field path '{0}': expected 'field' or 'field.subfield'")]
    InvalidFieldPath(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Import error: {0}")]
    Import(String),
}
