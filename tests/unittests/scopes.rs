// Scope and slot invariants: denseness, frame high-water marks,
// capture minimality, and reference classification.

use burin::{
    compile_expression, compile_module, default_namespace, OpKind, Operation, Script, Value,
};
use std::rc::Rc;

fn compile(source: &str) -> Rc<Operation> {
    compile_expression(Script::new("", source), &default_namespace()).unwrap()
}

fn compile_mod(source: &str) -> Rc<Operation> {
    compile_module(Script::new("", source), &default_namespace()).unwrap()
}

#[test]
fn test_let_slots_are_dense_and_ordered() {
    let op = compile("let(a=1, b=2, c=3) c");
    match &op.kind {
        OpKind::Let {
            first_slot,
            values,
            body,
        } => {
            assert_eq!(*first_slot, 0);
            assert_eq!(values.len(), 3);
            for value in values {
                assert!(matches!(value, Value::Thunk(_)));
            }
            // c is the last binding, slot 2
            assert!(matches!(body.kind, OpKind::LetRef(2)));
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_module_slots_are_dense_in_textual_order() {
    let op = compile_mod("a = 1; b = 2; c = 3");
    match &op.kind {
        OpKind::Module { dictionary, .. } => {
            let slots: Vec<usize> = dictionary.values().copied().collect();
            assert_eq!(slots, vec![0, 1, 2]);
            let names: Vec<&str> = dictionary.keys().map(|a| a.as_str()).collect();
            assert_eq!(names, vec!["a", "b", "c"]);
        }
        other => panic!("expected module, got {:?}", other),
    }
}

#[test]
fn test_nested_let_extends_the_frame() {
    let op = compile("let(a=1) let(b=2) a+b");
    match &op.kind {
        OpKind::Let {
            first_slot, body, ..
        } => {
            assert_eq!(*first_slot, 0);
            match &body.kind {
                OpKind::Let {
                    first_slot, body, ..
                } => {
                    // the inner let continues after the outer binding
                    assert_eq!(*first_slot, 1);
                    match &body.kind {
                        OpKind::Infix { left, right, .. } => {
                            assert!(matches!(left.kind, OpKind::LetRef(0)));
                            assert!(matches!(right.kind, OpKind::LetRef(1)));
                        }
                        other => panic!("expected infix, got {:?}", other),
                    }
                }
                other => panic!("expected inner let, got {:?}", other),
            }
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_lambda_frame_covers_params_and_locals() {
    let op = compile("(x) -> let(a=1) a+x");
    match &op.kind {
        OpKind::Lambda {
            body,
            nargs,
            nslots,
            ..
        } => {
            assert_eq!(*nargs, 1);
            // param slot 0 plus one let slot
            assert_eq!(*nslots, 2);
            match &body.kind {
                OpKind::Let {
                    first_slot, body, ..
                } => {
                    // locals start immediately after the arguments
                    assert_eq!(*first_slot, 1);
                    match &body.kind {
                        OpKind::Infix { left, right, .. } => {
                            assert!(matches!(left.kind, OpKind::LetRef(1)));
                            assert!(matches!(right.kind, OpKind::ArgRef(0)));
                        }
                        other => panic!("expected infix, got {:?}", other),
                    }
                }
                other => panic!("expected let body, got {:?}", other),
            }
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn test_for_variable_gets_the_next_slot() {
    let op = compile("let(a=1) [for (i = [a]) i + a]");
    match &op.kind {
        OpKind::Let { body, .. } => match &body.kind {
            OpKind::List(items) => match &items[0].kind {
                OpKind::For { slot, list, body } => {
                    assert_eq!(*slot, 1);
                    // the list is analyzed in the outer (let) scope
                    match &list.kind {
                        OpKind::List(items) => {
                            assert!(matches!(items[0].kind, OpKind::LetRef(0)));
                        }
                        other => panic!("expected list, got {:?}", other),
                    }
                    match &body.kind {
                        OpKind::Infix { left, right, .. } => {
                            assert!(matches!(left.kind, OpKind::LetRef(1)));
                            assert!(matches!(right.kind, OpKind::LetRef(0)));
                        }
                        other => panic!("expected infix, got {:?}", other),
                    }
                }
                other => panic!("expected for, got {:?}", other),
            },
            other => panic!("expected list, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_lambda_nslots_absorbs_for_scope() {
    let op = compile("(x) -> [for (i = [1,2]) i]");
    match &op.kind {
        OpKind::Lambda { nslots, .. } => assert_eq!(*nslots, 2),
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn test_module_frame_covers_slot_thunk_locals() {
    // the let inside the field thunk runs in the module's frame
    let op = compile_mod("a = let(b=1) b; a");
    match &op.kind {
        OpKind::Module { frame_nslots, .. } => assert_eq!(*frame_nslots, 1),
        other => panic!("expected module, got {:?}", other),
    }
}

// === Capture minimality ===

#[test]
fn test_unused_outer_bindings_are_not_captured() {
    let op = compile("let(k=2, j=3) (x -> x*k)");
    match &op.kind {
        OpKind::Let { body, .. } => match &body.kind {
            OpKind::Lambda {
                body, nonlocals, ..
            } => {
                assert_eq!(nonlocals.len(), 1, "only k is used");
                assert!(matches!(nonlocals[0].kind, OpKind::LetRef(0)));
                match &body.kind {
                    OpKind::Infix { left, right, .. } => {
                        assert!(matches!(left.kind, OpKind::ArgRef(0)));
                        assert!(matches!(right.kind, OpKind::NonlocalRef(0)));
                    }
                    other => panic!("expected infix, got {:?}", other),
                }
            }
            other => panic!("expected lambda, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_repeated_use_captures_once() {
    let op = compile("let(k=2) (x -> k+k)");
    match &op.kind {
        OpKind::Let { body, .. } => match &body.kind {
            OpKind::Lambda {
                body, nonlocals, ..
            } => {
                assert_eq!(nonlocals.len(), 1);
                match &body.kind {
                    OpKind::Infix { left, right, .. } => {
                        assert!(matches!(left.kind, OpKind::NonlocalRef(0)));
                        assert!(matches!(right.kind, OpKind::NonlocalRef(0)));
                    }
                    other => panic!("expected infix, got {:?}", other),
                }
            }
            other => panic!("expected lambda, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_transitive_capture_through_nested_lambdas() {
    let op = compile("let(a=1) (x -> (y -> x + a))");
    let outer = match &op.kind {
        OpKind::Let { body, .. } => body,
        other => panic!("expected let, got {:?}", other),
    };
    match &outer.kind {
        OpKind::Lambda {
            body, nonlocals, ..
        } => {
            // the outer lambda captures the let binding on behalf of
            // the inner one
            assert_eq!(nonlocals.len(), 1);
            assert!(matches!(nonlocals[0].kind, OpKind::LetRef(0)));
            match &body.kind {
                OpKind::Lambda {
                    body, nonlocals, ..
                } => {
                    // inner captures: the outer's parameter, then the
                    // outer's nonlocal
                    assert_eq!(nonlocals.len(), 2);
                    assert!(matches!(nonlocals[0].kind, OpKind::ArgRef(0)));
                    assert!(matches!(nonlocals[1].kind, OpKind::NonlocalRef(0)));
                    match &body.kind {
                        OpKind::Infix { left, right, .. } => {
                            assert!(matches!(left.kind, OpKind::NonlocalRef(0)));
                            assert!(matches!(right.kind, OpKind::NonlocalRef(1)));
                        }
                        other => panic!("expected infix, got {:?}", other),
                    }
                }
                other => panic!("expected inner lambda, got {:?}", other),
            }
        }
        other => panic!("expected outer lambda, got {:?}", other),
    }
}

// === Reference classification ===

#[test]
fn test_classification_inside_module_function() {
    // inside a recursive (module-bound) lambda: parameter, non-lambda
    // field, lambda field, builtin constant
    let op = compile_mod("v = 1; f(x) = x; g(y) = [y, v, f, pi]");
    match &op.kind {
        OpKind::Module { slots, .. } => match &slots[2] {
            Value::Lambda(lambda) => match &lambda.body.kind {
                OpKind::List(items) => {
                    assert!(matches!(items[0].kind, OpKind::ArgRef(0)));
                    assert!(matches!(items[1].kind, OpKind::ModuleRef(0)));
                    assert!(matches!(items[2].kind, OpKind::NonlocalFunctionRef(1)));
                    assert!(matches!(items[3].kind, OpKind::Constant(_)));
                }
                other => panic!("expected list body, got {:?}", other),
            },
            other => panic!("expected lambda slot, got {:?}", other),
        },
        other => panic!("expected module, got {:?}", other),
    }
}

#[test]
fn test_classification_inside_plain_lambda() {
    // a lambda that is not a module binding captures outer operations
    let op = compile("let(a=1) (x -> [x, a, pi])");
    match &op.kind {
        OpKind::Let { body, .. } => match &body.kind {
            OpKind::Lambda {
                body, nonlocals, ..
            } => {
                assert_eq!(nonlocals.len(), 1);
                match &body.kind {
                    OpKind::List(items) => {
                        assert!(matches!(items[0].kind, OpKind::ArgRef(0)));
                        assert!(matches!(items[1].kind, OpKind::NonlocalRef(0)));
                        assert!(matches!(items[2].kind, OpKind::Constant(_)));
                    }
                    other => panic!("expected list body, got {:?}", other),
                }
            }
            other => panic!("expected lambda, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_parameter_shadows_outer_binding() {
    let op = compile("let(x=1) (x -> x)");
    match &op.kind {
        OpKind::Let { body, .. } => match &body.kind {
            OpKind::Lambda {
                body, nonlocals, ..
            } => {
                assert!(nonlocals.is_empty());
                assert!(matches!(body.kind, OpKind::ArgRef(0)));
            }
            other => panic!("expected lambda, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_for_shadows_let_binding() {
    let op = compile("let(i=1) [for (i = [2]) i]");
    match &op.kind {
        OpKind::Let { body, .. } => match &body.kind {
            OpKind::List(items) => match &items[0].kind {
                OpKind::For { slot, body, .. } => {
                    assert_eq!(*slot, 1);
                    assert!(matches!(body.kind, OpKind::LetRef(1)));
                }
                other => panic!("expected for, got {:?}", other),
            },
            other => panic!("expected list, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}
