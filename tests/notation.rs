//! Notation tests: compile, parse, render, and the rendering round-trip.

use proptest::prelude::*;
use swiftmt::{compile, CharClass, Expected, FormatSpec, LengthRule, SubFields};

fn values(v: &[Option<&str>]) -> SubFields {
    v.iter().map(|x| x.map(str::to_string)).collect()
}

#[test]
fn compile_fixed_and_variable() {
    let spec = compile("3!a15d").expect("compile");
    assert_eq!(spec.len(), 2);
    assert_eq!(spec.subfields[0].class, CharClass::Alpha);
    assert_eq!(spec.subfields[0].length, LengthRule::Fixed(3));
    assert_eq!(spec.subfields[1].class, CharClass::Decimal);
    assert_eq!(spec.subfields[1].length, LengthRule::UpTo(15));
    assert!(!spec.subfields[1].is_optional());
}

#[test]
fn compile_group_and_multi_line() {
    let spec = compile("[/34x]4*35x").expect("compile");
    assert_eq!(spec.len(), 2);
    assert!(spec.subfields[0].is_optional());
    assert_eq!(spec.subfields[0].prefix, "/");
    assert!(spec.subfields[1].is_multi_line());
    assert_eq!(spec.subfields[1].max_lines, Some(4));
    assert_eq!(spec.subfields[1].length, LengthRule::UpTo(35));
}

#[test]
fn display_rederives_notation() {
    for notation in ["16x", "6!n", "4!c[/30x]", "3!a15d", "[/34x]4*35x", "4!n4!a2!a2!c[3!c]", "3!a/3!a", "16x/"] {
        let spec: FormatSpec = notation.parse().expect("compile");
        assert_eq!(spec.to_string(), notation);
    }
}

#[test]
fn compile_rejects_malformed_notation() {
    for notation in ["", "3!q", "[]", "3!a[", "0!a", "[3!a]/", "/", "4*x"] {
        let err = compile(notation).expect_err(notation);
        assert_eq!(err.notation, notation);
    }
}

#[test]
fn parse_currency_amount() {
    let spec = compile("3!a15d").expect("compile");
    let v = spec.parse("EUR100,00").expect("parse");
    assert_eq!(v.get(0), Some("EUR"));
    assert_eq!(v.get(1), Some("100,00"));
}

#[test]
fn parse_optional_group_by_leading_literal() {
    let spec = compile("4!c[/30x]").expect("compile");
    let v = spec.parse("URGP").expect("parse");
    assert_eq!(v, values(&[Some("URGP"), None]));
    let v = spec.parse("URGP/CALL BEFORE 10").expect("parse");
    assert_eq!(v, values(&[Some("URGP"), Some("CALL BEFORE 10")]));
}

#[test]
fn parse_account_and_lines() {
    let spec = compile("[/34x]4*35x").expect("compile");
    let v = spec.parse("/ACC1\nNAME\nSTREET").expect("parse");
    assert_eq!(v.get(0), Some("ACC1"));
    assert_eq!(v.lines(1), vec!["NAME", "STREET"]);

    let v = spec.parse("NAME").expect("parse");
    assert_eq!(v.get(0), None);
    assert_eq!(v.lines(1), vec!["NAME"]);
}

#[test]
fn parse_backtracks_variable_length() {
    let spec = compile("4c2!n").expect("compile");
    let v = spec.parse("AB12").expect("parse");
    assert_eq!(v, values(&[Some("AB"), Some("12")]));
}

#[test]
fn parse_group_without_literal_tried_present_then_absent() {
    let spec = compile("4!n4!a2!a2!c[3!c]").expect("compile");
    let v = spec.parse("1234BANKUSNYXXX").expect("parse");
    assert_eq!(v.get(4), Some("XXX"));
    let v = spec.parse("1234BANKUSNY").expect("parse");
    assert_eq!(v.get(3), Some("NY"));
    assert_eq!(v.get(4), None);
}

#[test]
fn parse_rejects_wrong_class() {
    let spec = compile("3!a").expect("compile");
    let err = spec.parse("EU1").expect_err("digit in alpha");
    assert_eq!(err.position, 2);
    assert_eq!(err.expected, Expected::SubField("3!a".to_string()));
    assert!(compile("3!a15d").expect("compile").parse("eur100").is_err());
}

#[test]
fn parse_rejects_short_fixed() {
    let spec = compile("6!n").expect("compile");
    let err = spec.parse("2401").expect_err("short date");
    assert_eq!(err.position, 4);
}

#[test]
fn parse_rejects_bad_decimal() {
    let spec = compile("3!a15d").expect("compile");
    assert!(spec.parse("EUR,50").is_err());
    assert!(spec.parse("EUR1,0,0").is_err());
    assert!(spec.parse("EUR").is_err());
}

#[test]
fn parse_multi_line_limits() {
    let spec = compile("4*35x").expect("compile");
    assert!(spec.parse("A\nB\nC\nD").is_ok());
    assert!(spec.parse("A\nB\nC\nD\nE").is_err());
    assert!(spec.parse(&"A".repeat(36)).is_err());
    assert!(spec.parse("A\n\nB").is_err());
}

#[test]
fn parse_reports_missing_line_break() {
    let spec = compile("[/34x]4*35x").expect("compile");
    let err = spec.parse("/ACC1").expect_err("no name line");
    assert_eq!(err.position, 5);
    assert_eq!(err.expected, Expected::LineBreak);
}

#[test]
fn parse_rejects_trailing_content() {
    let spec = compile("16x").expect("compile");
    let err = spec.parse(&"R".repeat(17)).expect_err("too long");
    assert_eq!(err.position, 16);
    assert_eq!(err.expected, Expected::End);
}

#[test]
fn render_omits_absent_group() {
    let spec = compile("4!c[/30x]").expect("compile");
    assert_eq!(spec.render(&values(&[Some("URGP"), None])).expect("render"), "URGP");
    assert_eq!(
        spec.render(&values(&[Some("URGP"), Some("INFO")])).expect("render"),
        "URGP/INFO"
    );
}

#[test]
fn render_multi_line_starts_on_new_line() {
    let spec = compile("[/34x]4*35x").expect("compile");
    let text = spec.render(&values(&[Some("ACC1"), Some("NAME\nSTREET")])).expect("render");
    assert_eq!(text, "/ACC1\nNAME\nSTREET");
    let text = spec.render(&values(&[None, Some("NAME")])).expect("render");
    assert_eq!(text, "NAME");
}

#[test]
fn render_rejects_missing_mandatory() {
    let spec = compile("4!c[/30x]").expect("compile");
    let err = spec.render(&values(&[None, Some("INFO")])).expect_err("missing code");
    assert_eq!(err.expected, Expected::Value { index: 0, token: "4!c".to_string() });
}

#[test]
fn render_rejects_invalid_values() {
    let spec = compile("3!a").expect("compile");
    assert!(spec.render(&values(&[Some("eur")])).is_err());
    assert!(spec.render(&values(&[Some("EURO")])).is_err());
    let err = spec.render(&values(&[Some("EUR"), Some("X")])).expect_err("extra");
    assert_eq!(err.expected, Expected::NoMoreValues { given: 2 });
}

#[test]
fn render_multi_line_reports_offending_position() {
    let spec = compile("4*35x").expect("compile");
    let err = spec.render(&values(&[Some("A\nB\nC\nD\nE")])).expect_err("five lines");
    assert_eq!(err.position, 7);
    let long = format!("A\n{}", "B".repeat(36));
    let err = spec.render(&values(&[Some(long.as_str())])).expect_err("long line");
    assert_eq!(err.position, 37);

    let spec = compile("[/34x]4*35x").expect("compile");
    let err = spec.render(&values(&[Some("ACC"), Some("N\n\t")])).expect_err("tab");
    assert_eq!(err.position, 7);
    assert_eq!(err.expected, Expected::SubField("4*35x".to_string()));
}

fn round_trip(notation: &str, v: &SubFields) -> Result<(), TestCaseError> {
    let spec = compile(notation).expect("compile");
    let text = spec.render(v).expect("render");
    let parsed = spec.parse(&text).expect("parse");
    prop_assert_eq!(&parsed, v);
    prop_assert_eq!(spec.render(&parsed).expect("render"), text);
    Ok(())
}

proptest! {
    #[test]
    fn reference_round_trips(reference in "[ -~]{1,16}") {
        round_trip("16x", &values(&[Some(reference.as_str())]))?;
    }

    #[test]
    fn date_round_trips(date in "[0-9]{6}") {
        round_trip("6!n", &values(&[Some(date.as_str())]))?;
    }

    #[test]
    fn instruction_code_round_trips(
        code in "[A-Z0-9]{4}",
        information in proptest::option::of("[ -~]{1,30}"),
    ) {
        round_trip("4!c[/30x]", &values(&[Some(code.as_str()), information.as_deref()]))?;
    }

    #[test]
    fn currency_amount_round_trips(
        currency in "[A-Z]{3}",
        amount in "[0-9]{1,12}(,[0-9]{0,2})?",
    ) {
        round_trip("3!a15d", &values(&[Some(currency.as_str()), Some(amount.as_str())]))?;
    }

    #[test]
    fn beneficiary_block_round_trips(
        account in proptest::option::of("[A-Z0-9]{1,34}"),
        lines in proptest::collection::vec("[A-Z0-9][A-Z0-9 ,.]{0,34}", 1..=4),
    ) {
        let joined = lines.join("\n");
        round_trip("[/34x]4*35x", &values(&[account.as_deref(), Some(joined.as_str())]))?;
    }

    #[test]
    fn identifier_code_round_trips(
        identifier in "[0-9]{4}[A-Z]{6}[A-Z0-9]{2}",
        branch in proptest::option::of("[A-Z0-9]{3}"),
    ) {
        let v = values(&[
            Some(&identifier[0..4]),
            Some(&identifier[4..8]),
            Some(&identifier[8..10]),
            Some(&identifier[10..12]),
            branch.as_deref(),
        ]);
        round_trip("4!n4!a2!a2!c[3!c]", &v)?;
    }

    #[test]
    fn account_round_trips(account in "[ -~]{1,34}") {
        round_trip("34x", &values(&[Some(account.as_str())]))?;
    }

    #[test]
    fn remittance_lines_round_trip(lines in proptest::collection::vec("[ -~]{1,35}", 1..=4)) {
        let joined = lines.join("\n");
        round_trip("4*35x", &values(&[Some(joined.as_str())]))?;
    }

    #[test]
    fn charge_code_round_trips(code in "[A-Z]{3}") {
        round_trip("3!a", &values(&[Some(code.as_str())]))?;
    }
}
