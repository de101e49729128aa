//! Numeric comparison matchers.
//!
//! Every comparison runs in the runtime value's own type: the threshold is
//! narrowed (wrapping) to that width first, so `int_greater_than(300)` sees
//! `44` when handed an `I8`. Strict integer comparisons accept every integer
//! kind; inclusive ones accept signed kinds only.

#![allow(missing_docs)]

use std::sync::Arc;

use super::{MatchFault, Matcher, SharedMatcher};
use crate::core::value::{KindSet, Value};

/// Ordering test applied as `actual <op> threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

impl Comparison {
    fn holds<T: PartialOrd>(self, actual: T, threshold: T) -> bool {
        match self {
            Self::GreaterThan => actual > threshold,
            Self::GreaterThanOrEqualTo => actual >= threshold,
            Self::LessThan => actual < threshold,
            Self::LessThanOrEqualTo => actual <= threshold,
        }
    }
}

#[derive(Debug)]
struct IntComparison {
    op: Comparison,
    threshold: i64,
    kinds: KindSet,
}

impl Matcher for IntComparison {
    fn supported_kinds(&self) -> KindSet {
        self.kinds
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    fn evaluate(&self, value: &Value) -> Result<bool, MatchFault> {
        let (op, t) = (self.op, self.threshold);
        Ok(match *value {
            Value::I8(n) => op.holds(n, t as i8),
            Value::I16(n) => op.holds(n, t as i16),
            Value::I32(n) => op.holds(n, t as i32),
            Value::I64(n) => op.holds(n, t),
            Value::Isize(n) => op.holds(n, t as isize),
            Value::U8(n) => op.holds(n, t as u8),
            Value::U16(n) => op.holds(n, t as u16),
            Value::U32(n) => op.holds(n, t as u32),
            Value::U64(n) => op.holds(n, t as u64),
            Value::Usize(n) => op.holds(n, t as usize),
            _ => false,
        })
    }
}

#[derive(Debug)]
struct FloatComparison {
    op: Comparison,
    threshold: f64,
}

impl Matcher for FloatComparison {
    fn supported_kinds(&self) -> KindSet {
        KindSet::FLOATS
    }

    #[allow(clippy::cast_possible_truncation)]
    fn evaluate(&self, value: &Value) -> Result<bool, MatchFault> {
        Ok(match value {
            Value::F32(n) => self.op.holds(*n, self.threshold as f32),
            Value::F64(n) => self.op.holds(*n, self.threshold),
            _ => false,
        })
    }
}

fn int(op: Comparison, threshold: i64) -> SharedMatcher {
    let kinds = match op {
        Comparison::GreaterThan | Comparison::LessThan => KindSet::INTS,
        Comparison::GreaterThanOrEqualTo | Comparison::LessThanOrEqualTo => KindSet::SIGNED_INTS,
    };
    Arc::new(IntComparison {
        op,
        threshold,
        kinds,
    })
}

fn float(op: Comparison, threshold: f64) -> SharedMatcher {
    Arc::new(FloatComparison { op, threshold })
}

pub fn int_greater_than(threshold: i64) -> SharedMatcher {
    int(Comparison::GreaterThan, threshold)
}

pub fn int_greater_than_or_equal_to(threshold: i64) -> SharedMatcher {
    int(Comparison::GreaterThanOrEqualTo, threshold)
}

pub fn int_less_than(threshold: i64) -> SharedMatcher {
    int(Comparison::LessThan, threshold)
}

pub fn int_less_than_or_equal_to(threshold: i64) -> SharedMatcher {
    int(Comparison::LessThanOrEqualTo, threshold)
}

pub fn float_greater_than(threshold: f64) -> SharedMatcher {
    float(Comparison::GreaterThan, threshold)
}

pub fn float_greater_than_or_equal_to(threshold: f64) -> SharedMatcher {
    float(Comparison::GreaterThanOrEqualTo, threshold)
}

pub fn float_less_than(threshold: f64) -> SharedMatcher {
    float(Comparison::LessThan, threshold)
}

pub fn float_less_than_or_equal_to(threshold: f64) -> SharedMatcher {
    float(Comparison::LessThanOrEqualTo, threshold)
}
