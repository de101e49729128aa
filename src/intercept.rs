//! Interception seam: the indirection cell every call site invokes through.
//!
//! A [`Function`] is a cloneable handle to one shared cell. Installing a
//! replacement swaps the cell's behavior, so every clone observes it;
//! reinstating puts the displaced behavior back. Nothing is patched at the
//! process level.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::errors::{MockaError, Result};
use crate::core::signature::Signature;
use crate::core::value::Value;
use crate::validate::pack_arguments;

/// Implementation installed in a cell. Receives the packed argument list
/// (variadic tail folded into one `List`).
pub type Behavior = Arc<dyn Fn(&[Value]) -> Vec<Value> + Send + Sync>;

/// Something a stub can take over and later hand back.
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str;
    fn signature(&self) -> &Signature;

    /// Install `replacement`, returning the behavior it displaced.
    ///
    /// Fails when nothing is bound yet or when `signature` differs from the
    /// target's own.
    fn install(&self, signature: &Signature, replacement: Behavior) -> Result<Behavior>;

    /// Put `displaced` back in place of `installed`.
    ///
    /// Fails with `RestoreOrder` when another replacement has been installed
    /// on top of `installed` and is still in place.
    fn reinstate(&self, installed: &Behavior, displaced: Behavior) -> Result<()>;

    /// Whether `behavior` is what call sites currently reach.
    fn is_installed(&self, behavior: &Behavior) -> bool;
}

struct Slot {
    current: Option<Behavior>,
    interceptions: usize,
}

struct Cell {
    name: String,
    signature: Signature,
    slot: RwLock<Slot>,
}

/// A named, typed callable whose behavior can be swapped at runtime.
///
/// ```
/// use mocka::{values, Function, Kind, Signature, Value};
///
/// let len = Function::new(
///     "len",
///     Signature::new([Kind::Str]).returns([Kind::I64]),
///     |args| match &args[0] {
///         Value::Str(s) => values![s.len() as i64],
///         _ => values![0_i64],
///     },
/// );
/// assert_eq!(len.call(&values!["abc"]).unwrap(), values![3_i64]);
/// ```
#[derive(Clone)]
pub struct Function {
    cell: Arc<Cell>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, signature: Signature, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> Vec<Value> + Send + Sync + 'static,
    {
        Self::with_slot(name.into(), signature, Some(Arc::new(implementation)))
    }

    /// A declared function with no implementation yet. Calling or stubbing
    /// it fails with `Unbound`.
    pub fn unbound(name: impl Into<String>, signature: Signature) -> Self {
        Self::with_slot(name.into(), signature, None)
    }

    fn with_slot(name: String, signature: Signature, current: Option<Behavior>) -> Self {
        Self {
            cell: Arc::new(Cell {
                name,
                signature,
                slot: RwLock::new(Slot {
                    current,
                    interceptions: 0,
                }),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.cell.name
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.cell.signature
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.cell.slot.read().current.is_some()
    }

    /// Whether a replacement is currently installed.
    #[must_use]
    pub fn is_intercepted(&self) -> bool {
        self.cell.slot.read().interceptions > 0
    }

    /// Call through the cell with a flat argument list.
    ///
    /// Arguments are checked against the signature first; a call that does
    /// not fit never reaches the installed behavior.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>> {
        let packed =
            pack_arguments(&self.cell.signature, args).map_err(|details| MockaError::InvalidCall {
                name: self.cell.name.clone(),
                details,
            })?;
        // Clone out of the lock: the behavior may be a stub that takes its
        // own lock, and a concurrent restore needs the write side.
        let behavior = self
            .cell
            .slot
            .read()
            .current
            .clone()
            .ok_or_else(|| MockaError::Unbound {
                name: self.cell.name.clone(),
            })?;
        Ok(behavior(&packed))
    }
}

impl Interceptor for Function {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn signature(&self) -> &Signature {
        Self::signature(self)
    }

    fn install(&self, signature: &Signature, replacement: Behavior) -> Result<Behavior> {
        if *signature != self.cell.signature {
            return Err(MockaError::SignatureMismatch {
                name: self.cell.name.clone(),
                expected: self.cell.signature.to_string(),
                received: signature.to_string(),
            });
        }
        let mut slot = self.cell.slot.write();
        let displaced = slot.current.clone().ok_or_else(|| MockaError::Unbound {
            name: self.cell.name.clone(),
        })?;
        slot.current = Some(replacement);
        slot.interceptions += 1;
        Ok(displaced)
    }

    fn reinstate(&self, installed: &Behavior, displaced: Behavior) -> Result<()> {
        let mut slot = self.cell.slot.write();
        if !is_current(&slot, installed) {
            return Err(MockaError::RestoreOrder {
                name: self.cell.name.clone(),
            });
        }
        slot.current = Some(displaced);
        slot.interceptions = slot.interceptions.saturating_sub(1);
        Ok(())
    }

    fn is_installed(&self, behavior: &Behavior) -> bool {
        is_current(&self.cell.slot.read(), behavior)
    }
}

fn is_current(slot: &Slot, behavior: &Behavior) -> bool {
    slot.current
        .as_ref()
        .is_some_and(|current| Arc::ptr_eq(current, behavior))
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.cell.name)
            .field("signature", &self.cell.signature)
            .field("bound", &self.is_bound())
            .field("intercepted", &self.is_intercepted())
            .finish()
    }
}
