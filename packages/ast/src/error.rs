use thiserror::Error;

pub type AstResult<T> = Result<T, AstError>;

/// Structural errors raised by collection mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("node has been destroyed and can no longer be mutated")]
    DestroyedNode,

    #[error("node is not attached to any collection")]
    NotAttached,

    #[error("operation does not apply to this node kind")]
    UnexpectedKind,
}

pub type RefineResult<T> = Result<T, RefineError>;

/// Errors raised while refining a raw declaration into its structured form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefineError {
    #[error("unparsable value `{value}` at offset {offset}")]
    UnparsableValue { value: String, offset: usize },

    #[error("declaration `{name}` has no value")]
    MissingValue { name: String },

    #[error(transparent)]
    Ast(#[from] AstError),
}
