// Behavioral tests driven by Logo source text, run through the library
// entry points directly (no binary spawn needed — PRINT/TYPE/SHOW all go
// through `Interpreter.terminal`, which a test can swap for a capturing
// double).

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use rlogo::surfaces::TerminalSurface;
use rlogo::Interpreter;
use test_case::test_case;

/// A `TerminalSurface` that appends every printed string to a shared
/// buffer instead of writing to stdout, so a test can assert on exactly
/// what PRINT/TYPE/SHOW produced.
struct CapturingTerminal {
    buffer: Rc<RefCell<String>>,
}

impl TerminalSurface for CapturingTerminal {
    fn print_to_console(&mut self, text: &str) -> io::Result<()> {
        self.buffer.borrow_mut().push_str(text);
        Ok(())
    }

    fn read_char(&mut self) -> io::Result<Option<char>> {
        Ok(None)
    }

    fn set_dribble(&mut self, _path: Option<&str>) -> io::Result<()> {
        Ok(())
    }

    fn is_dribbling(&self) -> bool {
        false
    }
}

/// Run `src` to completion against a fresh interpreter and return whatever
/// PRINT/TYPE/SHOW wrote. Panics (failing the test) if the script itself
/// raises an uncaught error.
fn run(src: &str) -> String {
    let buffer = Rc::new(RefCell::new(String::new()));
    let mut interp = Interpreter::new();
    *interp.terminal.borrow_mut() = Box::new(CapturingTerminal { buffer: buffer.clone() });
    interp.run_source("<test>", src).expect("script should run without raising");
    let out = buffer.borrow().clone();
    out
}

#[test]
fn test_01_arithmetic_precedence() {
    let output = run("show 1+3*3+2\nshow (1+3)*3+2\n");
    assert_eq!(output, "12\n14\n");
}

#[test]
fn test_02_error_report_shape() {
    let output = run(concat!(
        "to f\n",
        "notafunc\n",
        "end\n",
        "catch \"error [f]\n",
        "show error\n",
    ));
    // [13 I don't know how to notafunc f [notafunc]] — code, message,
    // enclosing procedure name, offending line.
    assert_eq!(output, "[13 I don't know how to notafunc f [notafunc]]\n");
}

#[test]
fn test_03_test_flip_flop() {
    let output = run(concat!(
        "test \"true\n",
        "iftrue [print 1]\n",
        "iffalse [print 2]\n",
    ));
    assert_eq!(output, "1\n");
}

#[test]
fn test_04_macro_trampoline() {
    let output = run(concat!(
        ".macro mr :n :i\n",
        "if :n=0 [output []]\n",
        "output se :i (list \"mr :n-1 :i)\n",
        "end\n",
        "mr 3 [print \"x]\n",
    ));
    assert_eq!(output, "x\nx\nx\n");
}

#[test]
fn test_05_cyclic_print_terminates() {
    // `.SETFIRST :a :a` makes `a`'s own first element alias `a` itself;
    // printing it must substitute "..." rather than recursing forever.
    let output = run(concat!(
        "make \"a [hello there]\n",
        ".setfirst :a :a\n",
        "show :a\n",
    ));
    assert_eq!(output, "[... there]\n");
}

#[test]
fn test_06_catch_of_divide_by_zero() {
    let output = run(concat!(
        "show catch \"error [1/0]\n",
        "show error\n",
    ));
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("[]"));
    let report = lines.next().expect("second SHOW line");
    assert!(report.starts_with("[4 "), "QUOTIENT's zero-divisor error is DoesntLike (code 4): {}", report);
}

#[test_case("print butfirst [a]", ""; "butfirst of a one-element list prints nothing")]
#[test_case("print item 3 \"helo", "l"; "item indexes into a word")]
#[test_case("print lput \"h \"ello", "elloh"; "lput onto a word appends a letter")]
#[test_case("print arity \"print", "0 1 -1"; "arity reports print's min default max")]
fn primitive_spot_checks(src: &str, expected: &str) {
    let output = run(src);
    assert_eq!(output, format!("{}\n", expected));
}

#[test]
fn test_07_apply_named_slot_template() {
    // `apply`'s list-template form binds `?`/`?N` to the argument list,
    // independent of any procedure call's own parameters.
    let output = run("print apply [sum ? ?2] [3 4]\n");
    assert_eq!(output, "7\n");
}

#[test]
fn test_09_goto_inside_if_jumps_in_enclosing_body() {
    // The canonical GOTO/TAG idiom: the jump target sits in the
    // procedure's own top-level statement list, but the GOTO that fires it
    // is nested inside an IF branch. This must land back at `loop`'s line
    // in the *procedure's* body, not loop forever inside the IF's own
    // (one-statement) nested list.
    let output = run(concat!(
        "to count\n",
        "make \"n 0\n",
        "tag \"loop\n",
        "make \"n :n+1\n",
        "print :n\n",
        "if :n<3 [goto \"loop]\n",
        "end\n",
        "count\n",
    ));
    assert_eq!(output, "1\n2\n3\n");
}

#[test]
fn test_08_save_and_load_round_trip() {
    // Drive SAVE/LOAD through `apply_named` with an already-evaluated path
    // argument rather than splicing the temp-dir path into Logo source text:
    // RUNPARSE would decompose a literal `/` in the path as QUOTIENT.
    use rlogo::datum::Datum;
    use rlogo::evaluator::apply_named;

    let path = std::env::temp_dir().join(format!("rlogo_save_load_{}.lg", std::process::id()));
    let path_str = path.to_str().expect("temp path is valid utf-8").to_string();

    let mut writer = Interpreter::new();
    writer
        .run_source("<writer>", "to greet\nprint \"hello\nend\nmake \"x 42\n")
        .expect("writer script should run without raising");
    apply_named(&mut writer, "SAVE", vec![Datum::word(&path_str)]).expect("SAVE should succeed");

    let buffer = Rc::new(RefCell::new(String::new()));
    let mut reader = Interpreter::new();
    *reader.terminal.borrow_mut() = Box::new(CapturingTerminal { buffer: buffer.clone() });
    apply_named(&mut reader, "LOAD", vec![Datum::word(&path_str)]).expect("LOAD should succeed");
    reader.run_source("<reader>", "print :x\ngreet\n").expect("loaded workspace should define greet and x");

    std::fs::remove_file(&path).ok();
    assert_eq!(buffer.borrow().as_str(), "42\nhello\n");
}
