//! Fixture functions shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use mocka::{Function, Kind, RecordingReporter, Signature, Value, values};

/// `fn(str) -> i64`, returning the string length.
pub fn len_fn() -> Function {
    Function::new(
        "len",
        Signature::new([Kind::Str]).returns([Kind::I64]),
        |args| {
            let n = args[0].as_str().map_or(0, str::len);
            values![i64::try_from(n).unwrap_or(i64::MAX)]
        },
    )
}

/// `fn(list, i64) -> i64`, returning list length plus `n`.
pub fn count_plus_fn() -> Function {
    Function::new(
        "count_plus",
        Signature::new([Kind::List, Kind::I64]).returns([Kind::I64]),
        |args| {
            let len = args[0].as_list().map_or(0, <[Value]>::len);
            let n = args[1].as_i64().unwrap_or(0);
            values![i64::try_from(len).unwrap_or(0) + n]
        },
    )
}

/// `fn(str, ...str) -> str`, joining the tail with the separator.
pub fn join_fn() -> Function {
    Function::new(
        "join",
        Signature::new([Kind::Str]).variadic(Kind::Str).returns([Kind::Str]),
        |args| {
            let sep = args[0].as_str().unwrap_or_default();
            let parts: Vec<&str> = args[1]
                .as_list()
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_str)
                .collect();
            values![parts.join(sep)]
        },
    )
}

pub fn reporter() -> Arc<RecordingReporter> {
    Arc::new(RecordingReporter::new())
}
