//! velac-util - Foundation types shared by every velac phase.
//!
//! This crate provides the small set of utilities the rest of the compiler
//! is built on:
//!
//! - [`Ident`]: interned identifier strings with O(1) comparison.
//! - [`SrcLoc`]: source locations attached to names, symbols, and errors.
//! - [`FreshGen`]: the monotonic counter behind every freshly minted
//!   identity in the compiler.
//! - [`Diagnostic`] / [`Handler`]: accumulation and reporting of user-facing
//!   errors.
//!
//! Everything here is a leaf: no other velac crate is a dependency.

pub mod diagnostic;
pub mod fresh;
pub mod ident;
pub mod loc;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use fresh::FreshGen;
pub use ident::Ident;
pub use loc::{FileId, SrcLoc};
