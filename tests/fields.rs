//! Field codec tests: decode, content rendering, typed getters and code tables.

use swiftmt::field::*;
use swiftmt::{compile, FieldValue, RawField};

#[test]
fn all_notations_compile() {
    for notation in notations::ALL {
        let spec = compile(notation).expect("compile");
        assert_eq!(spec.to_string(), *notation);
    }
}

#[test]
fn references_and_date() {
    let f = SendersReference::decode("REF1").expect("decode");
    assert_eq!(f.reference(), "REF1");
    assert_eq!(f.swift_text(), ":20:REF1");
    assert!(SendersReference::decode(&"R".repeat(17)).is_err());
    assert!(SendersReference::decode("").is_err());

    let f = CustomerSpecifiedReference::decode("COLL 2024/01").expect("decode");
    assert_eq!(f.reference(), "COLL 2024/01");

    let f = RequestedExecutionDate::decode("240115").expect("decode");
    assert_eq!(f.date(), "240115");
    assert!(RequestedExecutionDate::decode("24011").is_err());
    assert!(RequestedExecutionDate::decode("2401AB").is_err());
}

#[test]
fn currency_transaction_amount() {
    let f = CurrencyTransactionAmount::decode("EUR100,00").expect("decode");
    assert_eq!(f.currency(), "EUR");
    assert_eq!(f.amount(), "100,00");
    assert_eq!(f.content(), "EUR100,00");

    let f = CurrencyTransactionAmount::new("USD", "5,").expect("new");
    assert_eq!(f.swift_text(), ":32B:USD5,");

    assert!(CurrencyTransactionAmount::decode("EU100").is_err());
    assert!(CurrencyTransactionAmount::new("usd", "5").is_err());
    assert!(CurrencyTransactionAmount::new("USD", "1234567890123456").is_err());
}

#[test]
fn beneficiary_no_option() {
    let f = Beneficiary::decode("/ACC1\nNAME\nSTREET").expect("decode");
    assert_eq!(f.option(), BeneficiaryOption::NoOption);
    assert_eq!(f.account(), Some("/ACC1"));
    assert_eq!(f.name_and_address(), &["NAME".to_string(), "STREET".to_string()]);
    assert_eq!(f.identifier_code(), None);
    assert_eq!(f.content(), "/ACC1\nNAME\nSTREET");
}

#[test]
fn beneficiary_without_account() {
    let f = Beneficiary::decode("JOHN DOE\nMAIN STREET 1").expect("decode");
    assert_eq!(f.option(), BeneficiaryOption::NoOption);
    assert_eq!(f.account(), None);
    assert_eq!(f.name_and_address().len(), 2);
    assert_eq!(f.content(), "JOHN DOE\nMAIN STREET 1");
}

#[test]
fn beneficiary_account_block_is_trimmed() {
    let f = Beneficiary::decode("/ACC1\n  NAME  \n\nCITY").expect("decode");
    assert_eq!(f.name_and_address(), &["NAME".to_string(), "CITY".to_string()]);
    assert_eq!(f.content(), "/ACC1\nNAME\nCITY");
}

#[test]
fn beneficiary_option_a() {
    let f = Beneficiary::decode("1234BANKUSNYXXX\nGB00ACC").expect("decode");
    assert_eq!(f.option(), BeneficiaryOption::OptionA);
    assert_eq!(f.identifier_code(), Some("1234BANKUSNYXXX"));
    assert_eq!(f.account(), Some("GB00ACC"));
    assert!(f.name_and_address().is_empty());
    assert_eq!(f.content(), "1234BANKUSNYXXX\nGB00ACC");

    let f = Beneficiary::decode("1234BANKUSNY").expect("decode");
    assert_eq!(f.option(), BeneficiaryOption::OptionA);
    assert_eq!(f.account(), None);
}

#[test]
fn beneficiary_rejects_invalid_blocks() {
    assert!(Beneficiary::decode("/ACC1").is_err());
    assert!(Beneficiary::decode("A\nB\nC\nD\nE").is_err());
    assert!(Beneficiary::decode(&format!("/ACC1\n{}", "N".repeat(36))).is_err());
    assert!(Beneficiary::new(Some("ACC1".to_string()), vec!["NAME".to_string()]).is_err());
    assert!(Beneficiary::option_a("BANKUSNY", None).is_err());
}

#[test]
fn instruction_code() {
    let f = InstructionCode::decode("URGP").expect("decode");
    assert_eq!(f.code(), InstructionCodeValue::Urgp);
    assert_eq!(f.additional_information(), None);

    let f = InstructionCode::decode("CHQB/PAY TO ORDER").expect("decode");
    assert_eq!(f.code(), InstructionCodeValue::Chqb);
    assert_eq!(f.additional_information(), Some("PAY TO ORDER"));
    assert_eq!(f.content(), "CHQB/PAY TO ORDER");
}

#[test]
fn unknown_instruction_code_maps_to_other() {
    let f = InstructionCode::decode("ABCD").expect("decode");
    assert_eq!(f.code(), InstructionCodeValue::Othr);
    assert_eq!(f.content(), "OTHR");
    assert!(InstructionCode::decode("AB").is_err());
}

#[test]
fn instruction_code_table() {
    for code in InstructionCodeValue::ALL {
        assert_eq!(InstructionCodeValue::from_code(code.as_str()), *code);
        assert!(!code.description().is_empty());
    }
    assert_eq!(InstructionCodeValue::Sdcl.description(), "Same Day Clearing");
}

#[test]
fn details_of_charges() {
    for (text, code) in [("OUR", ChargeCode::Our), ("BEN", ChargeCode::Ben), ("SHA", ChargeCode::Sha)] {
        let f = DetailsOfCharges::decode(text).expect("decode");
        assert_eq!(f.code(), code);
        assert_eq!(f.content(), text);
        assert_eq!(text.parse::<ChargeCode>().expect("parse"), code);
    }
}

#[test]
fn unknown_charge_code_is_an_error() {
    match DetailsOfCharges::decode("XYZ") {
        Err(FieldError::UnknownCode { code, .. }) => assert_eq!(code, "XYZ"),
        other => panic!("expected UnknownCode, got {:?}", other),
    }
    assert!(matches!(DetailsOfCharges::decode("SH"), Err(FieldError::Format(_))));
}

#[test]
fn remittance_information() {
    let f = RemittanceInformation::decode("INVOICE 1\nINVOICE 2").expect("decode");
    assert_eq!(f.lines(), &["INVOICE 1".to_string(), "INVOICE 2".to_string()]);
    assert!(RemittanceInformation::decode("1\n2\n3\n4\n5").is_err());
    assert!(RemittanceInformation::new(Vec::new()).is_err());
}

#[test]
fn from_raw_checks_tag() {
    let raw = RawField::new("21", "TXN1", 3);
    match SendersReference::from_raw(&raw) {
        Err(FieldError::UnexpectedTag { expected, found }) => {
            assert_eq!(expected, "20");
            assert_eq!(found, "21");
        }
        other => panic!("expected UnexpectedTag, got {:?}", other),
    }
    assert!(TransactionReference::from_raw(&raw).is_ok());
}

#[test]
fn field_value_dispatch() {
    let v = FieldValue::decode(&RawField::new("32B", "EUR1,5", 1)).expect("decode");
    assert_eq!(v.tag(), "32B");
    assert_eq!(v.content(), "EUR1,5");
    assert!(matches!(v, FieldValue::CurrencyTransactionAmount(_)));

    let v = FieldValue::decode(&RawField::new("71A", "OUR", 1)).expect("decode");
    assert_eq!(v.swift_text(), ":71A:OUR");

    assert!(matches!(
        FieldValue::decode(&RawField::new("99", "X", 1)),
        Err(FieldError::UnknownTag(tag)) if tag == "99"
    ));
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn unreadable_line(result: Result<impl std::fmt::Debug, FieldError>) -> usize {
    match result {
        Err(FieldError::Unreadable { line, .. }) => line,
        other => panic!("expected Unreadable, got {:?}", other),
    }
}

#[test]
fn beneficiary_name_line_that_looks_like_identifier_is_rejected() {
    let result = Beneficiary::new(None, lines(&["1234BANKUSNYXXX"]));
    assert_eq!(unreadable_line(result), 1);
    assert!(Beneficiary::new(None, lines(&["1234BANKUSNYXXX", "NAME"])).is_err());
    let f = Beneficiary::new(None, lines(&["NAME", "1234BANKUSNYXXX"])).expect("new");
    assert_eq!(Beneficiary::decode(f.content()).expect("decode"), f);
}

#[test]
fn beneficiary_name_line_starting_with_slash_is_rejected() {
    let result = Beneficiary::new(None, lines(&["/X", "NAME"]));
    assert_eq!(unreadable_line(result), 1);
    let f = Beneficiary::new(Some("/X".to_string()), lines(&["NAME"])).expect("new");
    assert_eq!(Beneficiary::decode(f.content()).expect("decode"), f);
}

#[test]
fn beneficiary_padded_name_lines_after_account_are_rejected() {
    assert_eq!(unreadable_line(Beneficiary::new(Some("/A".to_string()), lines(&[" NAME"]))), 2);
    assert_eq!(
        unreadable_line(Beneficiary::new(Some("/A".to_string()), lines(&["NAME", "CITY "]))),
        3
    );
    let f = Beneficiary::new(None, lines(&[" NAME", "CITY "])).expect("new");
    assert_eq!(Beneficiary::decode(f.content()).expect("decode"), f);
}

#[test]
fn continuation_lines_that_end_a_field_are_rejected() {
    assert_eq!(unreadable_line(RemittanceInformation::new(lines(&["A", "-"]))), 2);
    assert_eq!(unreadable_line(RemittanceInformation::new(lines(&["A", ":20:X"]))), 2);
    assert_eq!(unreadable_line(Beneficiary::new(None, lines(&["NAME", "-"]))), 2);
    assert_eq!(
        unreadable_line(Beneficiary::new(Some("/A".to_string()), lines(&["NAME", ":21:TXN"]))),
        3
    );
    assert_eq!(
        unreadable_line(Beneficiary::option_a("1234BANKUSNYXXX", Some("-".to_string()))),
        2
    );

    let f = RemittanceInformation::new(lines(&["-", "A-B", "X:20:Y"])).expect("new");
    assert_eq!(RemittanceInformation::decode(f.content()).expect("decode"), f);
}

#[test]
fn line_items_with_line_breaks_are_rejected() {
    assert!(matches!(
        RemittanceInformation::new(lines(&["A\nB"])),
        Err(FieldError::Unreadable { line: 1, .. })
    ));
    assert!(matches!(
        Beneficiary::new(Some("/A".to_string()), lines(&["N", "B\nC"])),
        Err(FieldError::Unreadable { line: 3, .. })
    ));
}

#[test]
fn instruction_code_value_from_str_is_lenient() {
    assert_eq!("SDCL".parse::<InstructionCodeValue>(), Ok(InstructionCodeValue::Sdcl));
    assert_eq!("ZZZZ".parse::<InstructionCodeValue>(), Ok(InstructionCodeValue::Othr));
    let code: InstructionCodeValue = "INTC".parse().expect("infallible");
    assert_eq!(code.to_string(), "INTC");
}
