use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or non-integer token in the request stream.
    #[error("malformed input at token {position}: {reason}")]
    MalformedInput { position: usize, reason: String },

    /// Neither fixed packages nor a pay-per-use package are configured.
    #[error("catalog has no packages, cannot cover any request")]
    EmptyCatalog,

    /// No package in the catalog can start covering the request at `index`.
    #[error("request {index} cannot be covered by any package")]
    Uncoverable { index: usize },

    #[error("package id {0} is used more than once")]
    DuplicatePackageId(u32),

    #[error("cost accumulation overflowed")]
    CostOverflow,

    #[error("catalog file: {0}")]
    Catalog(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
