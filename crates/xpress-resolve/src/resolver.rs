//! Driver: structural checks, then the four passes in order.

use std::str::FromStr;

use crate::analyze::Resolver;
use crate::diagnostics::{Diagnostics, WarningClass};
use crate::model::{Model, ScopeData, ScopeId};
use crate::{Error, Result};

const DEFAULT_RECURSION_LIMIT: u32 = 4096;

/// The passes, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Imports,
    SubSupers,
    Types,
    Expressions,
}

impl Pass {
    pub const ALL: [Pass; 4] = [
        Self::Imports,
        Self::SubSupers,
        Self::Types,
        Self::Expressions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Imports => "imports",
            Self::SubSupers => "subsupers",
            Self::Types => "types",
            Self::Expressions => "expressions",
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub pass: Pass,
    /// Nodes this pass is responsible for that ended up resolved.
    pub resolved: usize,
    pub failed: usize,
    /// Diagnostics emitted during this pass.
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub diagnostics: Diagnostics,
    pub passes: Vec<PassSummary>,
}

impl Resolution {
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn summary(&self, pass: Pass) -> Option<&PassSummary> {
        self.passes.iter().find(|s| s.pass == pass)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Maximum nesting of the recursive walks before resolution gives up.
    pub recursion_limit: u32,
    pub disabled_warnings: Vec<WarningClass>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            disabled_warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolverBuilder {
    config: ResolveConfig,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.config.recursion_limit = limit;
        self
    }

    pub fn with_disabled_warning(mut self, class: WarningClass) -> Self {
        if !self.config.disabled_warnings.contains(&class) {
            self.config.disabled_warnings.push(class);
        }
        self
    }

    /// Disable a warning class by its name, e.g. `circular_select`.
    pub fn disable_warning(self, name: &str) -> Result<Self> {
        let class = WarningClass::from_str(name)?;
        Ok(self.with_disabled_warning(class))
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Resolve `model` in place.
    ///
    /// Ordinary problems end up in the returned diagnostics and leave the
    /// affected nodes `Failed`. `Err` means resolution stopped early and the
    /// graph is only partly annotated.
    pub fn resolve(&self, model: &mut Model) -> Result<Resolution> {
        validate(model)?;

        let mut diag = Diagnostics::new();
        for class in &self.config.disabled_warnings {
            diag.disable(*class);
        }

        let mut resolver = Resolver::new(model, diag, self.config.recursion_limit);
        let mut passes = Vec::with_capacity(Pass::ALL.len());
        for pass in Pass::ALL {
            passes.push(resolver.run(pass)?);
        }

        Ok(Resolution {
            diagnostics: resolver.into_diagnostics(),
            passes,
        })
    }
}

/// The root must be the EXPRESS scope and every other scope must reach it
/// through its parents.
fn validate(model: &Model) -> Result<()> {
    let root = model.root();
    if !matches!(model[root].data, ScopeData::Express) || model[root].parent.is_some() {
        return Err(Error::MalformedModel(
            "root scope is not the EXPRESS scope".to_owned(),
        ));
    }

    for index in 0..model.scope_count() {
        let start = ScopeId::from_index(index);
        let mut current = start;
        let mut steps = 0;
        while current != root {
            let Some(parent) = model[current].parent else {
                return Err(Error::MalformedModel(format!(
                    "scope `{}` is detached from the root",
                    model.name(model[start].symbol.name)
                )));
            };
            steps += 1;
            if steps > model.scope_count() {
                return Err(Error::MalformedModel(format!(
                    "scope `{}` has a cyclic parent chain",
                    model.name(model[start].symbol.name)
                )));
            }
            current = parent;
        }
    }
    Ok(())
}
