mod common;

use common::{load, run, run_builder};
use sust_core::{Engine, EngineConfig, ErrorKind, Value};

#[test]
fn for_covers_inclusive_range() {
    let source = "\
FUNC null show i int
TO_STRING i s
WRITE s cout
FUNC_END
INIT_VAR int lo
SET_VAR lo 1
INIT_VAR int hi
SET_VAR hi 5
FOR show lo hi
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "12345");
}

#[test]
fn for_with_start_past_end_calls_nothing() {
    let source = "\
FUNC null show i int
TO_STRING i s
WRITE s cout
FUNC_END
INIT_VAR int lo
SET_VAR lo 5
INIT_VAR int hi
SET_VAR hi 1
FOR show lo hi
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "");
}

#[test]
fn if_calls_only_when_true() {
    let source = "\
FUNC null yes
TEMP_VAR string t yes
WRITE t cout
FUNC_END
TEMP_VAR bool on true
IF on yes
TEMP_VAR bool off false
IF off yes
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "yes");
}

#[test]
fn while_runs_until_false() {
    let source = "\
INIT_VAR int n
INIT_VAR int limit
SET_VAR limit 3
FUNC bool step
TEMP_VAR int one 1
ADD_INT n one
LESS n limit result
FUNC_END
WHILE step
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.engine.globals().get("n"), Ok(Value::Integer(3)));
}

#[test]
fn while_needs_bool_function() {
    let outcome = run("FUNC int count\nFUNC_END\nWHILE count\n");
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 3);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn for_map_follows_insertion_order() {
    let source = "\
INIT_VAR map[string,int] m
SET_VAR m.b 2
SET_VAR m.a 1
SET_VAR m.c 3
FUNC null entry k string v int
WRITE k cout
WRITE v cout
FUNC_END
FOR_MAP entry m
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "b2a1c3");
}

#[test]
fn for_list_iterates_a_snapshot() {
    let source = "\
INIT_VAR string s
SET_VAR s abc
TO_CHARS s chars
FUNC null each c char
WRITE c cout
DROP_VAR chars.0
FUNC_END
FOR_LIST each chars
LIST_SIZE chars n
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "abc");
    assert_eq!(outcome.engine.globals().get("n"), Ok(Value::Integer(0)));
}

#[test]
fn for_string_visits_each_symbol() {
    let source = "\
INIT_VAR int seen
FUNC null each c char
TEMP_VAR int one 1
ADD_INT seen one
WRITE c cout
WRITE c cout
FUNC_END
INIT_VAR string s
SET_VAR s hey
FOR_STRING each s
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "hheeyy");
    assert_eq!(outcome.engine.globals().get("seen"), Ok(Value::Integer(3)));
}

#[test]
fn function_result_is_returned() {
    let source = "\
FUNC int double n int
COPY_VAR n result
ADD_INT result n
FUNC_END
INIT_VAR int x
SET_VAR x 21
USE_FUNC double y x
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.engine.globals().get("y"), Ok(Value::Integer(42)));
    assert_eq!(
        outcome.engine.call("double", vec![Value::Integer(5)]),
        Ok(Some(Value::Integer(10)))
    );
}

#[test]
fn argument_types_are_checked() {
    let source = "\
FUNC int double n int
FUNC_END
TEMP_VAR string s text
USE_FUNC double y s
";
    let outcome = run(source);
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 4);
    assert!(matches!(err.kind, ErrorKind::ArgumentMismatch { .. }));
    assert!(!outcome.engine.globals().contains("y"));
}

#[test]
fn missing_function_fails_before_anything_runs() {
    let outcome = run("INIT_VAR int x\nUSE_FUNC nothing r x\n");
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.function, None);
    assert_eq!(err.kind, ErrorKind::UnknownFunction("nothing".into()));
    assert!(!outcome.engine.globals().contains("r"));
}

#[test]
fn callback_errors_keep_their_location() {
    let outcome = run("FUNC null boom\nDROP_VAR ghost\nFUNC_END\nUSE_FUNC boom null\n");
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.opcode, "DROP_VAR");
    assert_eq!(err.function.as_deref(), Some("boom"));
}

#[test]
fn callers_locals_are_invisible() {
    let source = "\
FUNC null inner
WRITE secret cout
FUNC_END
FUNC null outer
TEMP_VAR string secret hidden
USE_FUNC inner null
FUNC_END
USE_FUNC outer null
";
    let outcome = run(source);
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.function.as_deref(), Some("inner"));
    assert_eq!(err.kind, ErrorKind::UnknownVariable("secret".into()));
    assert_eq!(outcome.out, "");
}

#[test]
fn return_ends_only_the_callback() {
    let source = "\
INIT_VAR string x
SET_VAR x x
FUNC null early
WRITE x cout
RETURN
WRITE x cout
FUNC_END
USE_FUNC early null
USE_FUNC early null
";
    let outcome = run(source);
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "xx");
}

#[test]
fn runaway_recursion_hits_call_depth() {
    let program = load("FUNC null down\nUSE_FUNC down null\nFUNC_END\nUSE_FUNC down null\n");
    let builder = Engine::builder(program).config(EngineConfig::new().with_max_call_depth(8));
    let outcome = run_builder(builder, b"");
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.function.as_deref(), Some("down"));
    assert_eq!(err.kind, ErrorKind::CallDepthExceeded(8));
}

#[test]
fn function_body_is_not_top_level() {
    let outcome = run("FUNC null never\nWRITE ghost cout\nFUNC_END\nTEMP_VAR string a ok\nWRITE a cout\n");
    outcome.result.expect("run failed");
    assert_eq!(outcome.out, "ok");
}
