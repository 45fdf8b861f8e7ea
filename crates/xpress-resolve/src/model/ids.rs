//! Typed arena indices.

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
            pub struct $name(u32);

            impl $name {
                #[inline]
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                #[inline]
                pub(crate) fn from_index(index: usize) -> Self {
                    Self(index as u32)
                }
            }
        )*
    };
}

arena_id! {
    /// Schema, entity, function, procedure, rule, query, loop increment,
    /// alias block, or the root EXPRESS scope.
    ScopeId;
    /// A type declaration or an anonymous type reference.
    TypeId;
    /// Structural type body. Shared between an alias and its target.
    BodyId;
    /// Attribute, parameter, constant, or local variable.
    VarId;
    ExprId;
    StmtId;
    /// One USE or REFERENCE import binding.
    RenameId;
}
