/// Broad category of a failure, used by front-ends to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A typed boundary value could not be parsed as a number.
    InvalidInput,
    /// Boundary values (or the score range) violate the ordering rules.
    InvalidConfiguration,
    /// The input table lacks a required column.
    MissingColumn,
    /// No usable scores were found where at least one is required.
    EmptyDataset,
    /// Reading or writing an external file failed.
    FileIo,
    /// The terminal backend failed.
    Terminal,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, 2, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, 2, message)
    }

    pub fn missing_column(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingColumn, 2, message)
    }

    pub fn empty_dataset(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyDataset, 3, message)
    }

    pub fn file_io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileIo, 2, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, 4, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
