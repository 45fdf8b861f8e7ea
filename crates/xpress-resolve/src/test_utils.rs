use crate::model::{ExprId, Literal, Model, ScopeId, Status, TypeId, VarId};
use crate::{Resolution, ResolverBuilder};

impl Model {
    /// Empty model with new symbols attributed to `test.exp`.
    pub fn for_test() -> Self {
        let mut model = Model::new();
        model.set_file("test.exp");
        model
    }

    #[track_caller]
    pub fn expect_resolution(&mut self) -> Resolution {
        self.expect_resolution_with(ResolverBuilder::new())
    }

    #[track_caller]
    pub fn expect_resolution_with(&mut self, builder: ResolverBuilder) -> Resolution {
        builder.resolve(self).unwrap()
    }

    #[track_caller]
    pub fn expect_valid(&mut self) -> Resolution {
        let resolution = self.expect_resolution();
        if !resolution.is_valid() {
            panic!(
                "Expected valid model, got error:\n{}",
                resolution.diagnostics.render(self.interner())
            );
        }

        resolution
    }

    /// Rendered diagnostics of a model that must have errors.
    #[track_caller]
    pub fn expect_invalid(&mut self) -> String {
        let resolution = self.expect_resolution();
        if resolution.is_valid() {
            panic!(
                "Expected invalid model, got:\n{}",
                resolution.diagnostics.render(self.interner())
            );
        }

        resolution.diagnostics.render(self.interner())
    }

    /// Rendered diagnostics, warnings included.
    #[track_caller]
    pub fn expect_diagnostics(&mut self) -> String {
        let resolution = self.expect_resolution();
        resolution.diagnostics.render(self.interner())
    }

    /// Bare type name `text` written in `scope`.
    pub fn ty(&mut self, scope: ScopeId, text: &str, line: u32) -> TypeId {
        let name = self.symbol(text, line);
        self.type_ref(scope, name)
    }

    pub fn ident(&mut self, text: &str, line: u32) -> ExprId {
        let name = self.symbol(text, line);
        self.identifier(name)
    }

    pub fn int(&mut self, value: i64, line: u32) -> ExprId {
        let at = self.symbol(&value.to_string(), line);
        self.literal(at, Literal::Integer(value))
    }

    pub fn scope_names(&self, ids: &[ScopeId]) -> Vec<&str> {
        ids.iter()
            .map(|id| self.name(self[*id].symbol.name))
            .collect()
    }

    pub fn type_name(&self, ty: TypeId) -> &str {
        self.name(self[ty].symbol.name)
    }

    pub fn expr_status(&self, id: ExprId) -> Status {
        self[id].status
    }

    /// Name of the type an expression was given.
    pub fn expr_type_name(&self, id: ExprId) -> Option<&str> {
        self[id].return_type.map(|ty| self.type_name(ty))
    }

    pub fn var_type_name(&self, id: VarId) -> &str {
        self.type_name(self[id].ty)
    }
}
