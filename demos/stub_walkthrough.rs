//! Walk through the main stub features against a small formatting function.
//!
//! Run with `cargo run --example stub_walkthrough`.

use std::sync::Arc;

use mocka::matcher::int_greater_than;
use mocka::{Function, Kind, Sandbox, Signature, StderrReporter, Value, args, values};

fn main() -> mocka::Result<()> {
    let format_age = Function::new(
        "format_age",
        Signature::new([Kind::Str, Kind::I64]).returns([Kind::Str, Kind::Error]),
        |args| {
            let name = args[0].as_str().unwrap_or("?");
            let age = args[1].as_i64().unwrap_or(0);
            values![format!("{name} is {age}"), Value::Nil]
        },
    );

    let sandbox = Sandbox::new(Arc::new(StderrReporter::new()));
    let stub = sandbox.stub_function(&format_age, values!["stubbed", Value::Nil])?;
    stub.on_second_call()
        .returns(values!["", Value::error("second call fails")])?;
    stub.with_args(args!["ada", int_greater_than(100)])
        .returns(values!["ada is ancient", Value::Nil])?;

    for (name, age) in [("bob", 30_i64), ("bob", 31), ("ada", 208), ("ada", 36)] {
        let out = format_age.call(&values![name, age])?;
        println!("format_age({name}, {age}) -> {}", Value::List(out));
    }

    println!("recorded {} call(s)", stub.call_count());
    if let Some(call) = stub.last_call() {
        println!("last call arguments: {}", Value::List(call.arguments().to_vec()));
    }

    sandbox.restore()?;
    let real = format_age.call(&values!["bob", 30_i64])?;
    println!("after restore -> {}", Value::List(real));
    Ok(())
}
