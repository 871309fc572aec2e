//! Emission errors.
//!
//! Grounded in the teacher's `faxc-gen::error::CodeGenError` (`thiserror`
//! enum of generator-internal failures), pared down to the one shape the
//! emitter can actually hit: emission only ever runs on an AST the
//! analyzer already accepted, so every failure here indicates the scope
//! tree the emitter is re-walking does not match the AST it was built
//! from, rather than anything a Kush program's author could trigger.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("internal: {0}")]
    Internal(String),
}

pub type EmitResult<T> = Result<T, EmitError>;
