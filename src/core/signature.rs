//! Statically declared callable shape: fixed parameters, optional variadic
//! tail, return kinds.

use std::fmt;

use crate::core::value::Kind;

/// Shape of a stubbable function.
///
/// ```
/// use mocka::{Kind, Signature};
///
/// let sig = Signature::new([Kind::Str, Kind::I64])
///     .variadic(Kind::Str)
///     .returns([Kind::I64, Kind::Error]);
/// assert_eq!(sig.to_string(), "fn(str, i64, ...str) -> (i64, error)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<Kind>,
    variadic: Option<Kind>,
    returns: Vec<Kind>,
}

impl Signature {
    /// Signature with the given fixed parameters and no return values.
    pub fn new(params: impl IntoIterator<Item = Kind>) -> Self {
        Self {
            params: params.into_iter().collect(),
            variadic: None,
            returns: Vec::new(),
        }
    }

    /// Add a variadic tail whose elements have kind `element`.
    #[must_use]
    pub fn variadic(mut self, element: Kind) -> Self {
        self.variadic = Some(element);
        self
    }

    /// Set the return kinds.
    #[must_use]
    pub fn returns(mut self, kinds: impl IntoIterator<Item = Kind>) -> Self {
        self.returns = kinds.into_iter().collect();
        self
    }

    /// Fixed (non-variadic) parameter kinds.
    #[must_use]
    pub fn params(&self) -> &[Kind] {
        &self.params
    }

    #[must_use]
    pub fn fixed_count(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    #[must_use]
    pub const fn variadic_kind(&self) -> Option<Kind> {
        self.variadic
    }

    /// Length of a packed argument list: fixed parameters plus one slot for
    /// the variadic tail.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len() + usize::from(self.variadic.is_some())
    }

    #[must_use]
    pub fn return_kinds(&self) -> &[Kind] {
        &self.returns
    }

    /// Return kinds rendered as `(i64, error)`.
    #[must_use]
    pub fn describe_returns(&self) -> String {
        let names: Vec<&str> = self.returns.iter().map(|k| k.name()).collect();
        format!("({})", names.join(", "))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        if let Some(tail) = self.variadic {
            parts.push(format!("...{tail}"));
        }
        write!(f, "fn({})", parts.join(", "))?;
        match self.returns.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            _ => write!(f, " -> {}", self.describe_returns()),
        }
    }
}
