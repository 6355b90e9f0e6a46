//! Fatal CLI errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("path not found: {}", path.display())]
    #[diagnostic(
        code(polypolarism::path_not_found),
        help("pass unit files (*.json) or directories containing them")
    )]
    PathNotFound { path: PathBuf },

    #[error("cannot read {}", path.display())]
    #[diagnostic(code(polypolarism::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode unit file {}", path.display())]
    #[diagnostic(
        code(polypolarism::decode),
        help("unit files hold one JSON module: {{\"functions\": [...]}}")
    )]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode results")]
    #[diagnostic(code(polypolarism::encode))]
    Encode(#[from] serde_json::Error),
}
