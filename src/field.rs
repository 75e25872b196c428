//! MT101 field codecs: one typed value per tag, converted to and from raw content
//! through the field's notation.
//!
//! | Tag   | Field                        | Notation                          |
//! |-------|------------------------------|-----------------------------------|
//! | `20`  | Sender's reference           | `16x`                             |
//! | `21R` | Customer specified reference | `16x`                             |
//! | `30`  | Requested execution date     | `6!n`                             |
//! | `21`  | Transaction reference        | `16x`                             |
//! | `23E` | Instruction code             | `4!c[/30x]`                       |
//! | `32B` | Currency/transaction amount  | `3!a15d`                          |
//! | `59`  | Beneficiary                  | `[/34x]4*35x` or option A         |
//! | `70`  | Remittance information       | `4*35x`                           |
//! | `71A` | Details of charges           | `3!a`                             |
//!
//! Values are validated on construction and keep their rendered content, so
//! [`SwiftField::content`] never fails.

use crate::ast::FormatSpec;
use crate::notation::{Expected, FieldFormatError, SubFields};
use crate::parser::compile;
use crate::tokenizer::{split_tag_line, RawField, PAGE_TERMINATOR};
use once_cell::sync::Lazy;
use regex::Regex;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Field tags handled by this crate.
pub mod tags {
    pub const SENDERS_REFERENCE: &str = "20";
    pub const CUSTOMER_SPECIFIED_REFERENCE: &str = "21R";
    pub const REQUESTED_EXECUTION_DATE: &str = "30";
    pub const TRANSACTION_REFERENCE: &str = "21";
    pub const INSTRUCTION_CODE: &str = "23E";
    pub const CURRENCY_TRANSACTION_AMOUNT: &str = "32B";
    pub const BENEFICIARY: &str = "59";
    pub const REMITTANCE_INFORMATION: &str = "70";
    pub const DETAILS_OF_CHARGES: &str = "71A";
}

/// Notation literals per field.
pub mod notations {
    pub const REFERENCE: &str = "16x";
    pub const DATE: &str = "6!n";
    pub const INSTRUCTION_CODE: &str = "4!c[/30x]";
    pub const CURRENCY_AMOUNT: &str = "3!a15d";
    pub const BENEFICIARY: &str = "[/34x]4*35x";
    pub const BENEFICIARY_IDENTIFIER: &str = "4!n4!a2!a2!c[3!c]";
    pub const BENEFICIARY_ACCOUNT: &str = "34x";
    pub const REMITTANCE_INFORMATION: &str = "4*35x";
    pub const CHARGES: &str = "3!a";

    pub const ALL: &[&str] = &[
        REFERENCE,
        DATE,
        INSTRUCTION_CODE,
        CURRENCY_AMOUNT,
        BENEFICIARY,
        BENEFICIARY_IDENTIFIER,
        BENEFICIARY_ACCOUNT,
        REMITTANCE_INFORMATION,
        CHARGES,
    ];
}

fn compiled(notation: &str) -> FormatSpec {
    compile(notation).expect("built-in notation compiles")
}

static REFERENCE: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::REFERENCE));
static DATE: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::DATE));
static INSTRUCTION_CODE: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::INSTRUCTION_CODE));
static CURRENCY_AMOUNT: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::CURRENCY_AMOUNT));
static BENEFICIARY: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::BENEFICIARY));
static BENEFICIARY_IDENTIFIER: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::BENEFICIARY_IDENTIFIER));
static BENEFICIARY_ACCOUNT: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::BENEFICIARY_ACCOUNT));
static REMITTANCE_INFORMATION: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::REMITTANCE_INFORMATION));
static CHARGES: Lazy<FormatSpec> = Lazy::new(|| compiled(notations::CHARGES));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error(transparent)]
    Format(#[from] FieldFormatError),
    #[error("unknown {kind} '{code}'")]
    UnknownCode { kind: &'static str, code: String },
    #[error("unexpected field tag '{found}', expected '{expected}'")]
    UnexpectedTag { expected: &'static str, found: String },
    #[error("no codec for field tag '{0}'")]
    UnknownTag(String),
    /// Content that is valid for the notation but would read back as something else.
    #[error("line {line} of field '{tag}' would not read back as written: {reason}")]
    Unreadable {
        tag: &'static str,
        line: usize,
        reason: &'static str,
    },
}

/// Codec contract shared by every MT101 field.
pub trait SwiftField: Sized {
    const TAG: &'static str;

    /// Decode raw content (without the `:TAG:` prefix).
    fn decode(content: &str) -> Result<Self, FieldError>;

    /// Rendered content, ready to follow the `:TAG:` prefix.
    fn content(&self) -> &str;

    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn from_raw(field: &RawField) -> Result<Self, FieldError> {
        if field.tag() != Self::TAG {
            return Err(FieldError::UnexpectedTag {
                expected: Self::TAG,
                found: field.tag().to_string(),
            });
        }
        Self::decode(field.content())
    }

    /// `:TAG:content`, the field as it appears in message text.
    fn swift_text(&self) -> String {
        format!(":{}:{}", Self::TAG, self.content())
    }
}

fn single(value: &str) -> SubFields {
    SubFields::new(vec![Some(value.to_string())])
}

fn required(values: &SubFields, index: usize, spec: &FormatSpec) -> Result<String, FieldError> {
    values.get(index).map(str::to_string).ok_or_else(|| {
        FieldError::Format(FieldFormatError {
            notation: spec.source.clone(),
            position: 0,
            expected: Expected::Value {
                index,
                token: spec.subfields[index].token(),
            },
        })
    })
}

/// Each item must stay a single line of content.
fn check_line_items(tag: &'static str, items: &[String], first_line: usize) -> Result<(), FieldError> {
    match items.iter().position(|item| item.contains('\n') || item.contains('\r')) {
        Some(n) => Err(FieldError::Unreadable {
            tag,
            line: first_line + n,
            reason: "line contains a line break",
        }),
        None => Ok(()),
    }
}

/// Lines after the first must not look like the page terminator or a new tag line.
fn check_continuation_lines(tag: &'static str, content: &str) -> Result<(), FieldError> {
    let clash = content
        .split('\n')
        .enumerate()
        .skip(1)
        .find(|(_, line)| *line == PAGE_TERMINATOR || split_tag_line(line).is_some());
    match clash {
        Some((n, _)) => Err(FieldError::Unreadable {
            tag,
            line: n + 1,
            reason: "line would be read as a page terminator or a new field",
        }),
        None => Ok(()),
    }
}

/// Fields holding a single free-text or numeric value.
macro_rules! single_value_field {
    ($(#[$doc:meta])* $name:ident, $tag:expr, $spec:ident, $getter:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            value: String,
        }

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
                let value = value.into();
                $spec.render(&single(&value))?;
                Ok($name { value })
            }

            pub fn $getter(&self) -> &str {
                &self.value
            }
        }

        impl SwiftField for $name {
            const TAG: &'static str = $tag;

            fn decode(content: &str) -> Result<Self, FieldError> {
                let values = $spec.parse(content)?;
                $name::new(required(&values, 0, &$spec)?)
            }

            fn content(&self) -> &str {
                &self.value
            }
        }
    };
}

single_value_field!(
    /// `:20:` Sender's reference, `16x`.
    SendersReference,
    tags::SENDERS_REFERENCE,
    REFERENCE,
    reference
);

single_value_field!(
    /// `:21R:` Customer specified reference, `16x`.
    CustomerSpecifiedReference,
    tags::CUSTOMER_SPECIFIED_REFERENCE,
    REFERENCE,
    reference
);

single_value_field!(
    /// `:30:` Requested execution date, `6!n` (YYMMDD).
    RequestedExecutionDate,
    tags::REQUESTED_EXECUTION_DATE,
    DATE,
    date
);

single_value_field!(
    /// `:21:` Transaction reference, `16x`. Opens a transaction group.
    TransactionReference,
    tags::TRANSACTION_REFERENCE,
    REFERENCE,
    reference
);

impl SendersReference {
    /// Empty stand-in used when a lenient reader accepts a page without `:20:`.
    pub(crate) fn placeholder() -> Self {
        SendersReference { value: String::new() }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

/// `:32B:` Currency/transaction amount, `3!a15d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyTransactionAmount {
    currency: String,
    amount: String,
    content: String,
}

impl CurrencyTransactionAmount {
    pub fn new(currency: impl Into<String>, amount: impl Into<String>) -> Result<Self, FieldError> {
        let currency = currency.into();
        let amount = amount.into();
        let content = CURRENCY_AMOUNT.render(&SubFields::new(vec![
            Some(currency.clone()),
            Some(amount.clone()),
        ]))?;
        Ok(CurrencyTransactionAmount {
            currency,
            amount,
            content,
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Amount with its decimal comma, e.g. `1000,00`.
    pub fn amount(&self) -> &str {
        &self.amount
    }
}

impl SwiftField for CurrencyTransactionAmount {
    const TAG: &'static str = tags::CURRENCY_TRANSACTION_AMOUNT;

    fn decode(content: &str) -> Result<Self, FieldError> {
        let values = CURRENCY_AMOUNT.parse(content)?;
        CurrencyTransactionAmount::new(
            required(&values, 0, &CURRENCY_AMOUNT)?,
            required(&values, 1, &CURRENCY_AMOUNT)?,
        )
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Layout of a beneficiary block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeneficiaryOption {
    /// Optional `/account` line followed by name and address lines.
    NoOption,
    /// Identifier code line, optionally followed by an account line.
    OptionA,
}

/// First-line shapes of `:59:` content, checked in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BeneficiaryShape {
    IdentifierCode,
    AccountLine,
    Other,
}

static IDENTIFIER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("identifier line pattern")
});

const BENEFICIARY_SHAPES: &[(BeneficiaryShape, fn(&str) -> bool)] = &[
    (BeneficiaryShape::IdentifierCode, is_identifier_line),
    (BeneficiaryShape::AccountLine, is_account_line),
];

fn is_identifier_line(line: &str) -> bool {
    IDENTIFIER_LINE.is_match(line)
}

fn is_account_line(line: &str) -> bool {
    line.starts_with('/')
}

fn first_line(content: &str) -> &str {
    content.split('\n').next().unwrap_or_default()
}

impl BeneficiaryShape {
    fn of(first_line: &str) -> Self {
        BENEFICIARY_SHAPES
            .iter()
            .find(|(_, matches)| matches(first_line))
            .map(|(shape, _)| *shape)
            .unwrap_or(BeneficiaryShape::Other)
    }
}

/// `:59:` Beneficiary.
///
/// The account is kept as written, including its leading `/` (e.g. `/DK1234567890`)
/// for [`BeneficiaryOption::NoOption`], and as a bare line for option A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beneficiary {
    option: BeneficiaryOption,
    account: Option<String>,
    name_and_address: Vec<String>,
    identifier_code: Option<String>,
    content: String,
}

impl Beneficiary {
    /// Beneficiary without option letter: `[/34x]4*35x`.
    ///
    /// Blocks that would read back as a different layout or with trimmed lines are
    /// rejected with [`FieldError::Unreadable`].
    pub fn new(account: Option<String>, name_and_address: Vec<String>) -> Result<Self, FieldError> {
        let first_name_line = if account.is_some() { 2 } else { 1 };
        check_line_items(tags::BENEFICIARY, &name_and_address, first_name_line)?;
        if account.is_some() {
            if let Some(n) = name_and_address.iter().position(|line| line.trim() != line) {
                return Err(FieldError::Unreadable {
                    tag: tags::BENEFICIARY,
                    line: first_name_line + n,
                    reason: "name and address lines after an account are trimmed",
                });
            }
        }
        let account_value = match &account {
            Some(line) => Some(
                line.strip_prefix('/')
                    .ok_or_else(|| FieldFormatError {
                        notation: notations::BENEFICIARY.to_string(),
                        position: 0,
                        expected: Expected::Literal("/".to_string()),
                    })?
                    .to_string(),
            ),
            None => None,
        };
        let lines = if name_and_address.is_empty() {
            None
        } else {
            Some(name_and_address.join("\n"))
        };
        let content = BENEFICIARY.render(&SubFields::new(vec![account_value, lines]))?;
        let shape = if account.is_some() {
            BeneficiaryShape::AccountLine
        } else {
            BeneficiaryShape::Other
        };
        if BeneficiaryShape::of(first_line(&content)) != shape {
            return Err(FieldError::Unreadable {
                tag: tags::BENEFICIARY,
                line: 1,
                reason: "first line reads as a different beneficiary layout",
            });
        }
        check_continuation_lines(tags::BENEFICIARY, &content)?;
        Ok(Beneficiary {
            option: BeneficiaryOption::NoOption,
            account,
            name_and_address,
            identifier_code: None,
            content,
        })
    }

    /// Option A: identifier code line (`4!n4!a2!a2!c[3!c]`) and optional account line (`34x`).
    pub fn option_a(identifier_code: impl Into<String>, account: Option<String>) -> Result<Self, FieldError> {
        let identifier_code = identifier_code.into();
        BENEFICIARY_IDENTIFIER.parse(&identifier_code)?;
        let mut content = identifier_code.clone();
        if let Some(account) = &account {
            content.push('\n');
            content.push_str(&BENEFICIARY_ACCOUNT.render(&single(account))?);
        }
        check_continuation_lines(tags::BENEFICIARY, &content)?;
        Ok(Beneficiary {
            option: BeneficiaryOption::OptionA,
            account,
            name_and_address: Vec::new(),
            identifier_code: Some(identifier_code),
            content,
        })
    }

    pub fn option(&self) -> BeneficiaryOption {
        self.option
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn name_and_address(&self) -> &[String] {
        &self.name_and_address
    }

    pub fn identifier_code(&self) -> Option<&str> {
        self.identifier_code.as_deref()
    }

    fn decode_option_a(content: &str) -> Result<Self, FieldError> {
        let (identifier, account) = match content.split_once('\n') {
            Some((identifier, rest)) => {
                let values = BENEFICIARY_ACCOUNT.parse(rest)?;
                (identifier, Some(required(&values, 0, &BENEFICIARY_ACCOUNT)?))
            }
            None => (content, None),
        };
        Beneficiary::option_a(identifier, account)
    }

    /// Account line first; name and address lines are trimmed and blank lines dropped.
    fn decode_account_block(content: &str) -> Result<Self, FieldError> {
        let mut lines = content.split('\n');
        let account = lines.next().unwrap_or_default().to_string();
        let name_and_address = lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Beneficiary::new(Some(account), name_and_address)
    }

    fn decode_free(content: &str) -> Result<Self, FieldError> {
        let values = BENEFICIARY.parse(content)?;
        let account = values.get(0).map(|a| format!("/{}", a));
        let name_and_address = values.lines(1).into_iter().map(str::to_string).collect();
        Beneficiary::new(account, name_and_address)
    }
}

impl SwiftField for Beneficiary {
    const TAG: &'static str = tags::BENEFICIARY;

    fn decode(content: &str) -> Result<Self, FieldError> {
        match BeneficiaryShape::of(first_line(content)) {
            BeneficiaryShape::IdentifierCode => Beneficiary::decode_option_a(content),
            BeneficiaryShape::AccountLine => Beneficiary::decode_account_block(content),
            BeneficiaryShape::Other => Beneficiary::decode_free(content),
        }
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Known `:23E:` instruction codes.
///
/// Decoding maps any code outside this set to [`InstructionCodeValue::Othr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionCodeValue {
    Urgp,
    Intc,
    Rtgs,
    Cort,
    Chqb,
    Dmst,
    Intl,
    Sdcl,
    Bacs,
    Othr,
}

impl InstructionCodeValue {
    pub const ALL: &'static [InstructionCodeValue] = &[
        InstructionCodeValue::Urgp,
        InstructionCodeValue::Intc,
        InstructionCodeValue::Rtgs,
        InstructionCodeValue::Cort,
        InstructionCodeValue::Chqb,
        InstructionCodeValue::Dmst,
        InstructionCodeValue::Intl,
        InstructionCodeValue::Sdcl,
        InstructionCodeValue::Bacs,
        InstructionCodeValue::Othr,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstructionCodeValue::Urgp => "URGP",
            InstructionCodeValue::Intc => "INTC",
            InstructionCodeValue::Rtgs => "RTGS",
            InstructionCodeValue::Cort => "CORT",
            InstructionCodeValue::Chqb => "CHQB",
            InstructionCodeValue::Dmst => "DMST",
            InstructionCodeValue::Intl => "INTL",
            InstructionCodeValue::Sdcl => "SDCL",
            InstructionCodeValue::Bacs => "BACS",
            InstructionCodeValue::Othr => "OTHR",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InstructionCodeValue::Urgp => "Urgent Payment",
            InstructionCodeValue::Intc => "Intra-company Payment",
            InstructionCodeValue::Rtgs => "Real Time Gross Settlement",
            InstructionCodeValue::Cort => "Financial Payment",
            InstructionCodeValue::Chqb => "Cheque",
            InstructionCodeValue::Dmst => "Domestic Payment",
            InstructionCodeValue::Intl => "International Payment",
            InstructionCodeValue::Sdcl => "Same Day Clearing",
            InstructionCodeValue::Bacs => "BACS Payment UK",
            InstructionCodeValue::Othr => "Other",
        }
    }

    /// Lenient lookup: unknown codes become `OTHR`.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|known| known.as_str() == code)
            .unwrap_or(InstructionCodeValue::Othr)
    }
}

impl FromStr for InstructionCodeValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

impl fmt::Display for InstructionCodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `:23E:` Instruction code, `4!c[/30x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionCode {
    code: InstructionCodeValue,
    additional_information: Option<String>,
    content: String,
}

impl InstructionCode {
    pub fn new(code: InstructionCodeValue, additional_information: Option<String>) -> Result<Self, FieldError> {
        let content = INSTRUCTION_CODE.render(&SubFields::new(vec![
            Some(code.as_str().to_string()),
            additional_information.clone(),
        ]))?;
        Ok(InstructionCode {
            code,
            additional_information,
            content,
        })
    }

    pub fn code(&self) -> InstructionCodeValue {
        self.code
    }

    pub fn additional_information(&self) -> Option<&str> {
        self.additional_information.as_deref()
    }
}

impl SwiftField for InstructionCode {
    const TAG: &'static str = tags::INSTRUCTION_CODE;

    fn decode(content: &str) -> Result<Self, FieldError> {
        let values = INSTRUCTION_CODE.parse(content)?;
        let code = InstructionCodeValue::from_code(&required(&values, 0, &INSTRUCTION_CODE)?);
        InstructionCode::new(code, values.get(1).map(str::to_string))
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// `:71A:` charge codes. Unknown codes are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeCode {
    Our,
    Ben,
    Sha,
}

impl ChargeCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChargeCode::Our => "OUR",
            ChargeCode::Ben => "BEN",
            ChargeCode::Sha => "SHA",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChargeCode::Our => "Our charges - sender pays",
            ChargeCode::Ben => "Beneficiary charges - sender pays",
            ChargeCode::Sha => "Shared charges - split",
        }
    }
}

impl FromStr for ChargeCode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OUR" => Ok(ChargeCode::Our),
            "BEN" => Ok(ChargeCode::Ben),
            "SHA" => Ok(ChargeCode::Sha),
            other => Err(FieldError::UnknownCode {
                kind: "charge code",
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChargeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `:71A:` Details of charges, `3!a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailsOfCharges {
    code: ChargeCode,
}

impl DetailsOfCharges {
    pub fn new(code: ChargeCode) -> Self {
        DetailsOfCharges { code }
    }

    pub fn code(&self) -> ChargeCode {
        self.code
    }
}

impl SwiftField for DetailsOfCharges {
    const TAG: &'static str = tags::DETAILS_OF_CHARGES;

    fn decode(content: &str) -> Result<Self, FieldError> {
        let values = CHARGES.parse(content)?;
        let code: ChargeCode = required(&values, 0, &CHARGES)?.parse()?;
        Ok(DetailsOfCharges::new(code))
    }

    fn content(&self) -> &str {
        self.code.as_str()
    }
}

/// `:70:` Remittance information, `4*35x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemittanceInformation {
    lines: Vec<String>,
    content: String,
}

impl RemittanceInformation {
    pub fn new(lines: Vec<String>) -> Result<Self, FieldError> {
        check_line_items(tags::REMITTANCE_INFORMATION, &lines, 1)?;
        let joined = if lines.is_empty() { None } else { Some(lines.join("\n")) };
        let content = REMITTANCE_INFORMATION.render(&SubFields::new(vec![joined]))?;
        check_continuation_lines(tags::REMITTANCE_INFORMATION, &content)?;
        Ok(RemittanceInformation { lines, content })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl SwiftField for RemittanceInformation {
    const TAG: &'static str = tags::REMITTANCE_INFORMATION;

    fn decode(content: &str) -> Result<Self, FieldError> {
        let values = REMITTANCE_INFORMATION.parse(content)?;
        RemittanceInformation::new(values.lines(0).into_iter().map(str::to_string).collect())
    }

    fn content(&self) -> &str {
        &self.content
    }
}
