//! Property-based tests for the resolution engine.
//!
//! Arbitrary override layouts and call sequences must resolve exactly as a
//! straightforward model predicts, the ledger must grow by one per call, and
//! binding-local counters must advance only on matching calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use super::{Stub, StubOptions};
use crate::core::signature::Signature;
use crate::core::value::{Kind, KindSet, Value};
use crate::intercept::Function;
use crate::matcher::satisfies;
use crate::report::RecordingReporter;
use crate::validate::{Arg, build_matchers, validate_argument_count};
use crate::{args, values};

// ──────────────────── strategies ────────────────────

fn arb_overrides() -> impl Strategy<Value = BTreeMap<usize, i64>> {
    prop::collection::btree_map(0usize..12, -50i64..50, 0..6)
}

fn arb_signature() -> impl Strategy<Value = Signature> {
    let kind = prop_oneof![Just(Kind::Str), Just(Kind::I64), Just(Kind::Bool)];
    (prop::collection::vec(kind.clone(), 0..4), prop::option::of(kind))
        .prop_map(|(params, variadic)| {
            let signature = Signature::new(params);
            match variadic {
                Some(kind) => signature.variadic(kind),
                None => signature,
            }
        })
}

fn int_fn() -> Function {
    Function::new(
        "echo",
        Signature::new([Kind::I64]).returns([Kind::I64]),
        |args| args.to_vec(),
    )
}

fn stub_on(target: &Function, default: i64) -> Stub {
    let reporter = Arc::new(RecordingReporter::new());
    Stub::create_with(reporter, target, values![default], StubOptions::default())
        .expect("create")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn global_overrides_resolve_by_index(
        default in -50i64..50,
        overrides in arb_overrides(),
        calls in 0usize..16,
    ) {
        let target = int_fn();
        let stub = stub_on(&target, default);
        for (index, value) in &overrides {
            stub.on_call(*index).returns(values![*value]).unwrap();
        }

        for i in 0..calls {
            let got = target.call(&values![0_i64]).unwrap();
            let expected = overrides.get(&i).copied().unwrap_or(default);
            prop_assert_eq!(got, values![expected]);
        }
        prop_assert_eq!(stub.call_count(), calls);
    }

    #[test]
    fn ledger_records_every_call_in_order(args in prop::collection::vec(-100i64..100, 0..20)) {
        let target = int_fn();
        let stub = stub_on(&target, 7);
        for arg in &args {
            target.call(&values![*arg]).unwrap();
        }

        let recorded: Vec<Value> = stub
            .calls()
            .iter()
            .map(|call| call.arguments()[0].clone())
            .collect();
        let expected: Vec<Value> = args.iter().copied().map(Value::from).collect();
        prop_assert_eq!(recorded, expected);
        prop_assert!(stub.calls().iter().all(|c| c.return_values() == values![7_i64].as_slice()));
    }

    #[test]
    fn binding_counter_advances_only_on_match(
        args in prop::collection::vec(0i64..4, 0..20),
        binding_override in prop::option::of(0usize..5),
    ) {
        let target = int_fn();
        let stub = stub_on(&target, -1);
        let binding = stub.with_args(args![0_i64]);
        binding.returns(values![100_i64]).unwrap();
        if let Some(index) = binding_override {
            binding.on_call(index).returns(values![200_i64]).unwrap();
        }

        let mut matched = 0usize;
        for arg in &args {
            let got = target.call(&values![*arg]).unwrap();
            let expected: i64 = if *arg == 0 {
                let local = matched;
                matched += 1;
                if binding_override == Some(local) { 200 } else { 100 }
            } else {
                -1
            };
            prop_assert_eq!(got, values![expected]);
        }
        prop_assert_eq!(binding.call_count(), matched);
        prop_assert_eq!(stub.call_count(), args.len());
    }

    #[test]
    fn argument_count_rule(signature in arb_signature(), count in 0usize..7) {
        let fixed = signature.fixed_count();
        let expected = if signature.is_variadic() { count >= fixed } else { count == fixed };
        prop_assert_eq!(validate_argument_count(&signature, count), expected);

        let pattern: Vec<Arg> = (0..count)
            .map(|_| Arg::from(satisfies(KindSet::ALL, |_| true)))
            .collect();
        let built = build_matchers(&signature, &pattern);
        prop_assert_eq!(built.is_ok(), expected);
        if let Ok(matchers) = built {
            prop_assert_eq!(matchers.len(), signature.arity());
        }
    }
}
