//! Argument and return-value validation against a [`Signature`].
//!
//! Two directions: `with_args` patterns become matcher lists
//! ([`build_matchers`]), and live call arguments become the packed list the
//! behaviors see ([`pack_arguments`]). Return values are checked on
//! assignment, never on invocation.

use std::fmt;
use std::sync::Arc;

use crate::core::errors::{MockaError, Result};
use crate::core::signature::Signature;
use crate::core::value::{Kind, Value, describe_kinds};
use crate::matcher::{SharedMatcher, equals, nil, slice_of};

/// One element of an argument pattern: a literal value or a matcher.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Matcher(SharedMatcher),
}

impl Arg {
    /// Pattern identity: equal values, or the very same matcher instance.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Matcher(a), Self::Matcher(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(Value::Nil) => f.write_str("nil"),
            Self::Value(v) => write!(f, "{v}: {}", v.type_name()),
            Self::Matcher(m) => write!(f, "matcher{:?}", m.supported_kinds()),
        }
    }
}

macro_rules! arg_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

arg_from_value!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, &str, Value
);

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Self::Value(Value::from(items))
    }
}

impl From<SharedMatcher> for Arg {
    fn from(matcher: SharedMatcher) -> Self {
        Self::Matcher(matcher)
    }
}

/// Build a `Vec<Arg>` from values and matchers.
///
/// ```
/// use mocka::{args, matcher};
///
/// let pattern = args!["123", matcher::int_greater_than(5)];
/// assert_eq!(pattern.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

fn describe_args(args: &[Arg]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Arity rule: exact for plain signatures, at least the fixed count for
/// variadic ones.
#[must_use]
pub fn validate_argument_count(signature: &Signature, count: usize) -> bool {
    if signature.is_variadic() {
        count >= signature.fixed_count()
    } else {
        count == signature.fixed_count()
    }
}

/// Turn a `with_args` pattern into one matcher per packed argument slot.
///
/// The variadic tail gets a single slot: `nil()` when no tail arguments were
/// given, otherwise a `slice_of` over per-element matchers.
pub fn build_matchers(signature: &Signature, args: &[Arg]) -> Result<Vec<SharedMatcher>> {
    let invalid = || MockaError::ArgumentValidation {
        signature: signature.to_string(),
        provided: describe_args(args),
    };
    if !validate_argument_count(signature, args.len()) {
        return Err(invalid());
    }

    let mut matchers = Vec::with_capacity(signature.arity());
    for (arg, kind) in args.iter().zip(signature.params()) {
        matchers.push(matcher_for(arg, *kind).ok_or_else(invalid)?);
    }

    if let Some(element) = signature.variadic_kind() {
        let tail = &args[signature.fixed_count()..];
        if tail.is_empty() {
            matchers.push(nil());
        } else {
            let elements = tail
                .iter()
                .map(|arg| matcher_for(arg, element).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()?;
            matchers.push(slice_of(elements));
        }
    }

    Ok(matchers)
}

fn matcher_for(arg: &Arg, kind: Kind) -> Option<SharedMatcher> {
    match arg {
        Arg::Matcher(m) => (kind == Kind::Any || m.supports(kind)).then(|| Arc::clone(m)),
        Arg::Value(v) if !kind.accepts(v) => None,
        Arg::Value(Value::Nil) => Some(nil()),
        Arg::Value(v) => Some(equals(v.clone())),
    }
}

/// Exact count, and every value accepted by its declared return kind.
#[must_use]
pub fn validate_return_values(signature: &Signature, values: &[Value]) -> bool {
    let kinds = signature.return_kinds();
    kinds.len() == values.len() && kinds.iter().zip(values).all(|(k, v)| k.accepts(v))
}

pub fn check_return_values(signature: &Signature, values: &[Value]) -> Result<()> {
    if validate_return_values(signature, values) {
        Ok(())
    } else {
        Err(MockaError::ReturnValidation {
            expected: signature.describe_returns(),
            received: describe_kinds(values),
        })
    }
}

/// Check a flat call and fold the variadic tail into one `List`.
///
/// Returns a human-readable reason on failure; the caller wraps it in an
/// error naming the function.
pub fn pack_arguments(
    signature: &Signature,
    args: &[Value],
) -> std::result::Result<Vec<Value>, String> {
    if !validate_argument_count(signature, args.len()) {
        let expected = if signature.is_variadic() {
            format!("at least {}", signature.fixed_count())
        } else {
            signature.fixed_count().to_string()
        };
        return Err(format!(
            "{signature} takes {expected} argument(s), received {}",
            args.len()
        ));
    }

    for (position, (kind, value)) in signature.params().iter().zip(args).enumerate() {
        if !kind.accepts(value) {
            return Err(format!(
                "argument {position} must be {kind}, received {}",
                value.type_name()
            ));
        }
    }

    let fixed = signature.fixed_count();
    let mut packed = args[..fixed].to_vec();
    if let Some(element) = signature.variadic_kind() {
        let tail = &args[fixed..];
        if let Some((offset, value)) = tail.iter().enumerate().find(|(_, v)| !element.accepts(v)) {
            return Err(format!(
                "variadic argument {} must be {element}, received {}",
                fixed + offset,
                value.type_name()
            ));
        }
        packed.push(Value::List(tail.to_vec()));
    }
    Ok(packed)
}
