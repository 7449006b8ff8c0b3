use thiserror::Error;

use crate::browsers::Browser;
use crate::version::Version;
use stylecraft_ast::AstError;

pub type PrefixResult<T> = Result<T, PrefixError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrefixError {
    /// Caller misuse: the requested version is not in the browser's known
    /// version list.
    #[error("unknown version {version} for {browser}")]
    UnknownVersion { browser: Browser, version: Version },

    /// Corrupt compatibility table or AST state: a name expected to carry a
    /// vendor prefix starts with a marker no vendor uses.
    #[error("malformed vendor prefix in `{name}`")]
    MalformedPrefix { name: String },

    #[error("invalid version literal `{text}`")]
    VersionParse { text: String },

    #[error(transparent)]
    Ast(#[from] AstError),
}
