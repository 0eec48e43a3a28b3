//! Named entities

use std::fmt;

use crate::token::Token;
use crate::types::Type;

/// A name bound to a type
///
/// The token is the one from the first declaration; later compatible
/// declarations only update the type.
#[derive(Debug, Clone)]
pub struct Id {
    token: Token,
    ty: Type,
}

impl Id {
    pub fn new(token: Token, ty: Type) -> Self {
        Self { token, ty }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn name(&self) -> &str {
        self.token.name()
    }

    /// Shared handle to the bound type
    pub fn ty(&self) -> Type {
        self.ty.clone()
    }

    pub(crate) fn set_ty(&mut self, ty: Type) {
        self.ty = ty;
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.token, self.ty)
    }
}
