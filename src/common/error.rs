//! Unified error type for tabella operations.
//!
//! Malformed markup is never an error: spans clamp, oversized tables set
//! an overflow flag, and structurally inconsistent input degrades to
//! empty results. The variants here cover misuse of the API itself.
use thiserror::Error;

/// Main error type for tabella operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An event was fed to a builder whose outermost table has already closed
    #[error("builder already produced a finished table")]
    BuilderFinished,

    /// `finish` was called before the outermost table closed
    #[error("table construction is still pending; outermost table never closed")]
    IncompleteTable,

    /// Column widths were requested a second time for the same table
    #[error("layout has already been computed for this table")]
    LayoutAlreadyComputed,

    /// The grid was handed to the assembler a second time
    #[error("table has already been assembled into a document model")]
    AlreadyAssembled,
}

/// Result type for tabella operations.
pub type Result<T> = std::result::Result<T, Error>;
