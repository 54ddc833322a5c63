//! Error types for the editor

use slidekit_common::CommonError;
use thiserror::Error;

use crate::export::ExportError;
use crate::mutations::MutationError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Storage error: {0}")]
    Storage(#[from] CommonError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
