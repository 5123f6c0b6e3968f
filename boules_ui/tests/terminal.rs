use std::io::Cursor;

use boules_traits::Operator;
use boules_ui::TerminalOperator;
use rstest::rstest;

fn operator(input: &str) -> TerminalOperator<Cursor<Vec<u8>>, Vec<u8>> {
    TerminalOperator::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn output(op: TerminalOperator<Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8(op.into_output()).unwrap()
}

#[rstest]
#[case("42\n", None, 42)]
#[case("\n", None, 105)]
#[case("\n", Some(35), 35)]
#[case("  77  \n", Some(35), 77)]
#[case("500\n", None, 200)]
#[case("-4\n", None, 10)]
#[case("abc\n12.5\n60\n", None, 60)]
fn integer_prompt(#[case] input: &str, #[case] default: Option<i32>, #[case] expected: i32) {
    let mut op = operator(input);
    assert_eq!(op.request_integer(10, 200, default).unwrap(), expected);
}

#[test]
fn integer_prompt_reports_clamping_and_bad_input() {
    let mut op = operator("x\n999\n");
    assert_eq!(op.request_integer(1, 95, Some(5)).unwrap(), 95);
    let out = output(op);
    assert!(out.contains("[1-95] (5)"));
    assert!(out.contains("'x' is not a whole number"));
    assert!(out.contains("using 95"));
}

#[test]
fn closed_input_is_an_error() {
    let mut op = operator("");
    let err = op.request_integer(1, 10, None).unwrap_err();
    assert_eq!(err.to_string(), "input closed");
    assert!(op.request_boolean("Again?").is_err());
}

#[test]
fn empty_range_is_an_error() {
    let mut op = operator("5\n");
    assert!(op.request_integer(10, 1, None).is_err());
}

#[rstest]
#[case("\n", true)]
#[case("y\n", true)]
#[case("Ja\n", true)]
#[case("YES\n", true)]
#[case("n\n", false)]
#[case("nein\n", false)]
#[case("maybe\nno\n", false)]
fn boolean_prompt(#[case] input: &str, #[case] expected: bool) {
    let mut op = operator(input);
    assert_eq!(op.request_boolean("Again?").unwrap(), expected);
}

#[test]
fn display_writes_each_line() {
    let mut op = operator("");
    op.display(&["Please enter", "a distance", "in cm"]);
    assert_eq!(output(op), "Please enter\na distance\nin cm\n");
}
