//! xpress-resolve: semantic resolution for parsed EXPRESS schemas.
//!
//! Takes the declaration graph a parser produced, with every cross reference
//! still a bare name, and binds each name to its declaration. Types and
//! expressions are checked along the way. Problems go to a diagnostics
//! stream; the graph is annotated in place.
//!
//! # Example
//!
//! ```
//! use xpress_resolve::{Model, ResolverBuilder};
//!
//! let mut model = Model::new();
//! model.set_file("shapes.exp");
//! let schema_name = model.symbol("shapes", 1);
//! let schema = model.add_schema(schema_name);
//! let point = model.symbol("point", 2);
//! let entity = model.add_entity(schema, point);
//! let x = model.symbol("x", 3);
//! let real = model.symbol("real", 3);
//! let real = model.type_ref(entity, real);
//! model.add_attribute(entity, x, real);
//!
//! let resolution = ResolverBuilder::new().resolve(&mut model).expect("recursion limit");
//! assert!(!resolution.diagnostics.has_errors());
//! ```

pub mod diagnostics;
pub mod model;

mod analyze;
mod resolver;

#[cfg(test)]
mod test_utils;

pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity, WarningClass};
pub use model::Model;
pub use resolver::{Pass, PassSummary, Resolution, ResolveConfig, ResolverBuilder};

/// Errors that stop resolution outright.
///
/// Everything else is reported through `Diagnostics`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Declarations nested or chained too deeply.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// The graph handed over breaks a structural assumption.
    #[error("malformed declaration graph: {0}")]
    MalformedModel(String),

    #[error("unknown warning class `{0}`")]
    UnknownWarning(String),
}

pub type Result<T> = std::result::Result<T, Error>;
