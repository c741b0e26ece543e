// Property tests for the analyzer.
//
// Pins determinism (same source, same IR), closure-capture rules for
// builtin constants, and source back-pointer validity.

use super::strategies::{arb_constant_name, arb_expr_source};
use burin::{compile_expression, default_namespace, OpKind, Operation, Script, Value};
use proptest::prelude::*;
use std::rc::Rc;

/// Structural equality of operations, ignoring source back-pointers
fn op_eq(a: &Operation, b: &Operation) -> bool {
    use OpKind::*;
    match (&a.kind, &b.kind) {
        (Constant(x), Constant(y)) => value_eq(x, y),
        (Not(x), Not(y)) => op_eq(x, y),
        (Prefix { op: o1, arg: a1 }, Prefix { op: o2, arg: a2 }) => o1 == o2 && op_eq(a1, a2),
        (
            Infix {
                op: o1,
                left: l1,
                right: r1,
            },
            Infix {
                op: o2,
                left: l2,
                right: r2,
            },
        ) => o1 == o2 && op_eq(l1, l2) && op_eq(r1, r2),
        (And { left: l1, right: r1 }, And { left: l2, right: r2 })
        | (Or { left: l1, right: r1 }, Or { left: l2, right: r2 })
        | (Equal { left: l1, right: r1 }, Equal { left: l2, right: r2 })
        | (NotEqual { left: l1, right: r1 }, NotEqual { left: l2, right: r2 })
        | (Less { left: l1, right: r1 }, Less { left: l2, right: r2 })
        | (Greater { left: l1, right: r1 }, Greater { left: l2, right: r2 })
        | (LessOrEqual { left: l1, right: r1 }, LessOrEqual { left: l2, right: r2 })
        | (GreaterOrEqual { left: l1, right: r1 }, GreaterOrEqual { left: l2, right: r2 })
        | (Power { left: l1, right: r1 }, Power { left: l2, right: r2 }) => {
            op_eq(l1, l2) && op_eq(r1, r2)
        }
        (Dot { expr: e1, field: f1 }, Dot { expr: e2, field: f2 }) => f1 == f2 && op_eq(e1, e2),
        (At { expr: e1, index: i1 }, At { expr: e2, index: i2 }) => {
            op_eq(e1, e2) && op_eq(i1, i2)
        }
        (If { cond: c1, then: t1 }, If { cond: c2, then: t2 }) => op_eq(c1, c2) && op_eq(t1, t2),
        (
            IfElse {
                cond: c1,
                then: t1,
                otherwise: e1,
            },
            IfElse {
                cond: c2,
                then: t2,
                otherwise: e2,
            },
        ) => op_eq(c1, c2) && op_eq(t1, t2) && op_eq(e1, e2),
        (
            Let {
                first_slot: f1,
                values: v1,
                body: b1,
            },
            Let {
                first_slot: f2,
                values: v2,
                body: b2,
            },
        ) => f1 == f2 && values_eq(v1, v2) && op_eq(b1, b2),
        (
            For {
                slot: s1,
                list: l1,
                body: b1,
            },
            For {
                slot: s2,
                list: l2,
                body: b2,
            },
        ) => s1 == s2 && op_eq(l1, l2) && op_eq(b1, b2),
        (
            RangeGen {
                first: f1,
                last: l1,
                step: s1,
            },
            RangeGen {
                first: f2,
                last: l2,
                step: s2,
            },
        ) => {
            op_eq(f1, f2)
                && op_eq(l1, l2)
                && match (s1, s2) {
                    (None, None) => true,
                    (Some(a), Some(b)) => op_eq(a, b),
                    _ => false,
                }
        }
        (List(x), List(y)) | (Sequence(x), Sequence(y)) => ops_eq(x, y),
        (Record { fields: f1 }, Record { fields: f2 }) => {
            f1.len() == f2.len()
                && f1
                    .iter()
                    .zip(f2.iter())
                    .all(|((n1, o1), (n2, o2))| n1 == n2 && op_eq(o1, o2))
        }
        (
            Lambda {
                body: b1,
                nonlocals: n1,
                nargs: a1,
                nslots: s1,
            },
            Lambda {
                body: b2,
                nonlocals: n2,
                nargs: a2,
                nslots: s2,
            },
        ) => a1 == a2 && s1 == s2 && op_eq(b1, b2) && ops_eq(n1, n2),
        (
            Call {
                function: f1,
                argv: v1,
                ..
            },
            Call {
                function: f2,
                argv: v2,
                ..
            },
        ) => op_eq(f1, f2) && ops_eq(v1, v2),
        (
            Module {
                dictionary: d1,
                slots: s1,
                elements: e1,
                frame_nslots: n1,
            },
            Module {
                dictionary: d2,
                slots: s2,
                elements: e2,
                frame_nslots: n2,
            },
        ) => d1 == d2 && n1 == n2 && values_eq(s1, s2) && ops_eq(e1, e2),
        (Echo { argv: v1 }, Echo { argv: v2 }) => ops_eq(v1, v2),
        (ArgRef(x), ArgRef(y))
        | (LetRef(x), LetRef(y))
        | (ModuleRef(x), ModuleRef(y))
        | (NonlocalRef(x), NonlocalRef(y))
        | (NonlocalFunctionRef(x), NonlocalFunctionRef(y)) => x == y,
        _ => false,
    }
}

fn ops_eq(xs: &[Rc<Operation>], ys: &[Rc<Operation>]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| op_eq(x, y))
}

/// Value equality that compares thunks and lambdas structurally rather
/// than by identity
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Thunk(x), Value::Thunk(y)) => op_eq(x, y),
        (Value::Lambda(x), Value::Lambda(y)) => {
            x.nargs == y.nargs && x.nslots == y.nslots && op_eq(&x.body, &y.body)
        }
        (Value::Native(x), Value::Native(y)) => x.name == y.name,
        _ => a == b,
    }
}

fn values_eq(xs: &[Value], ys: &[Value]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| value_eq(x, y))
}

/// The direct sub-operations of an operation, including those inside
/// slot values
fn op_children(op: &Operation) -> Vec<Rc<Operation>> {
    use OpKind::*;
    match &op.kind {
        Constant(value) => value_children(value),
        Not(a) | Prefix { arg: a, .. } => vec![a.clone()],
        Infix { left, right, .. }
        | And { left, right }
        | Or { left, right }
        | Equal { left, right }
        | NotEqual { left, right }
        | Less { left, right }
        | Greater { left, right }
        | LessOrEqual { left, right }
        | GreaterOrEqual { left, right }
        | Power { left, right } => vec![left.clone(), right.clone()],
        Dot { expr, .. } => vec![expr.clone()],
        At { expr, index } => vec![expr.clone(), index.clone()],
        If { cond, then } => vec![cond.clone(), then.clone()],
        IfElse {
            cond,
            then,
            otherwise,
        } => vec![cond.clone(), then.clone(), otherwise.clone()],
        Let { values, body, .. } => {
            let mut out: Vec<Rc<Operation>> = values.iter().flat_map(value_children).collect();
            out.push(body.clone());
            out
        }
        For { list, body, .. } => vec![list.clone(), body.clone()],
        RangeGen { first, last, step } => {
            let mut out = vec![first.clone(), last.clone()];
            if let Some(step) = step {
                out.push(step.clone());
            }
            out
        }
        List(items) | Sequence(items) => items.to_vec(),
        Record { fields } => fields.values().cloned().collect(),
        Lambda {
            body, nonlocals, ..
        } => {
            let mut out = vec![body.clone()];
            out.extend(nonlocals.iter().cloned());
            out
        }
        Call { function, argv, .. } => {
            let mut out = vec![function.clone()];
            out.extend(argv.iter().cloned());
            out
        }
        Module {
            slots, elements, ..
        } => {
            let mut out: Vec<Rc<Operation>> = slots.iter().flat_map(value_children).collect();
            out.extend(elements.iter().cloned());
            out
        }
        Echo { argv } => argv.iter().cloned().collect(),
        ArgRef(_) | LetRef(_) | ModuleRef(_) | NonlocalRef(_) | NonlocalFunctionRef(_) => {
            Vec::new()
        }
    }
}

fn value_children(value: &Value) -> Vec<Rc<Operation>> {
    match value {
        Value::Thunk(op) => vec![op.clone()],
        Value::Lambda(lambda) => vec![lambda.body.clone()],
        _ => Vec::new(),
    }
}

/// Every operation's source back-pointer must reference the compiled
/// script with an in-bounds byte range
fn sources_valid(op: &Operation, script_source: &str) -> bool {
    let location = op.source.location();
    let token = location.token();
    token.first <= token.last
        && (token.last as usize) <= script_source.len()
        && op_children(op).iter().all(|c| sources_valid(c, script_source))
}

proptest! {
    #[test]
    fn prop_closed_sources_analyze(src in arb_expr_source()) {
        let ns = default_namespace();
        prop_assert!(compile_expression(Script::new("", &src), &ns).is_ok());
    }

    #[test]
    fn prop_analysis_is_deterministic(src in arb_expr_source()) {
        let ns = default_namespace();
        let a = compile_expression(Script::new("", &src), &ns).unwrap();
        let b = compile_expression(Script::new("", &src), &ns).unwrap();
        prop_assert!(op_eq(&a, &b));
    }

    #[test]
    fn prop_constants_are_inlined_not_captured(name in arb_constant_name()) {
        let src = format!("x -> {}", name);
        let ns = default_namespace();
        let op = compile_expression(Script::new("", &src), &ns).unwrap();
        match &op.kind {
            OpKind::Lambda { body, nonlocals, .. } => {
                prop_assert!(nonlocals.is_empty());
                prop_assert!(matches!(body.kind, OpKind::Constant(_)));
            }
            other => prop_assert!(false, "expected lambda, got {:?}", other),
        }
    }

    #[test]
    fn prop_source_backpointers_are_in_bounds(src in arb_expr_source()) {
        let ns = default_namespace();
        let op = compile_expression(Script::new("", &src), &ns).unwrap();
        prop_assert!(sources_valid(&op, &src));
    }
}
