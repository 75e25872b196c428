//! MT101 pages: Sequence A header fields followed by repeated Sequence B
//! transaction groups, read from and rendered to message text.
//!
//! Reading is a state machine over the tokenizer's field stream:
//!
//! ```text
//! AwaitHeaderStart        --20-->  AwaitCustomerReference
//! AwaitCustomerReference  --21R--> AwaitExecutionDate
//! AwaitCustomerReference  --30-->  AwaitGroupStart
//! AwaitExecutionDate      --30-->  AwaitGroupStart
//! AwaitCustomerReference, AwaitExecutionDate, AwaitGroupStart --21--> InGroup
//! AwaitHeaderStart        --21-->  InGroup (lenient readers only)
//! InGroup                 --23E | 32B | 59 | 70 | 71A, each once--> InGroup
//! InGroup                 --21-->  InGroup (previous group closed)
//! any state               --'-' or end of input--> page closed
//! ```
//!
//! A page is returned whole or not at all.

use crate::field::*;
use crate::tokenizer::{FieldTokenizer, RawField, TokenizerError, PAGE_TERMINATOR, PREAMBLE};
use crate::value::FieldValue;
use std::fmt;
use std::io::BufRead;

/// Message type identifier of [`Page`].
pub const MESSAGE_ID: &str = "101";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: field '{tag}': {source}")]
    Field {
        line: usize,
        tag: String,
        #[source]
        source: FieldError,
    },
    #[error("line {line}: unexpected {}, expected {}", describe_tag(.found), .expected.join(" | "))]
    UnexpectedField {
        line: usize,
        found: String,
        expected: Vec<&'static str>,
    },
    #[error("line {line}: missing mandatory field '{tag}' in {context}")]
    MissingMandatoryField {
        line: usize,
        tag: &'static str,
        context: String,
    },
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

impl ParseError {
    /// 1-based source line of the field that triggered the failure.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Field { line, .. }
            | ParseError::UnexpectedField { line, .. }
            | ParseError::MissingMandatoryField { line, .. } => *line,
            ParseError::Tokenizer(e) => e.line(),
        }
    }
}

fn describe_tag(tag: &str) -> String {
    match tag {
        PREAMBLE => "text before the first field".to_string(),
        PAGE_TERMINATOR => "page terminator '-'".to_string(),
        other => format!("field '{}'", other),
    }
}

/// Reader options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Accept a page that starts directly with `:21:`, substituting an empty
    /// placeholder sender's reference. Such pages render without a `:20:` line.
    pub allow_missing_senders_reference: bool,
}

/// One Sequence B element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionGroup {
    transaction_reference: TransactionReference,
    instruction_code: Option<InstructionCode>,
    currency_transaction_amount: CurrencyTransactionAmount,
    beneficiary: Beneficiary,
    remittance_information: Option<RemittanceInformation>,
    details_of_charges: Option<DetailsOfCharges>,
}

impl TransactionGroup {
    pub fn new(
        transaction_reference: TransactionReference,
        instruction_code: Option<InstructionCode>,
        currency_transaction_amount: CurrencyTransactionAmount,
        beneficiary: Beneficiary,
        remittance_information: Option<RemittanceInformation>,
        details_of_charges: Option<DetailsOfCharges>,
    ) -> Self {
        TransactionGroup {
            transaction_reference,
            instruction_code,
            currency_transaction_amount,
            beneficiary,
            remittance_information,
            details_of_charges,
        }
    }

    pub fn transaction_reference(&self) -> &TransactionReference {
        &self.transaction_reference
    }

    pub fn instruction_code(&self) -> Option<&InstructionCode> {
        self.instruction_code.as_ref()
    }

    pub fn currency_transaction_amount(&self) -> &CurrencyTransactionAmount {
        &self.currency_transaction_amount
    }

    pub fn beneficiary(&self) -> &Beneficiary {
        &self.beneficiary
    }

    pub fn remittance_information(&self) -> Option<&RemittanceInformation> {
        self.remittance_information.as_ref()
    }

    pub fn details_of_charges(&self) -> Option<&DetailsOfCharges> {
        self.details_of_charges.as_ref()
    }

    /// Fields in emission order: `21, 23E, 32B, 59, 70, 71A`.
    pub fn fields(&self) -> Vec<FieldValue> {
        let mut out: Vec<FieldValue> = vec![self.transaction_reference.clone().into()];
        if let Some(f) = &self.instruction_code {
            out.push(f.clone().into());
        }
        out.push(self.currency_transaction_amount.clone().into());
        out.push(self.beneficiary.clone().into());
        if let Some(f) = &self.remittance_information {
            out.push(f.clone().into());
        }
        if let Some(f) = self.details_of_charges {
            out.push(f.into());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a page needs at least one transaction group")]
pub struct EmptyPageError;

/// One MT101 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    senders_reference: SendersReference,
    customer_specified_reference: Option<CustomerSpecifiedReference>,
    requested_execution_date: Option<RequestedExecutionDate>,
    transaction_groups: Vec<TransactionGroup>,
}

impl Page {
    pub fn new(
        senders_reference: SendersReference,
        customer_specified_reference: Option<CustomerSpecifiedReference>,
        requested_execution_date: Option<RequestedExecutionDate>,
        transaction_groups: Vec<TransactionGroup>,
    ) -> Result<Self, EmptyPageError> {
        if transaction_groups.is_empty() {
            return Err(EmptyPageError);
        }
        Ok(Page {
            senders_reference,
            customer_specified_reference,
            requested_execution_date,
            transaction_groups,
        })
    }

    pub fn id(&self) -> &'static str {
        MESSAGE_ID
    }

    pub fn senders_reference(&self) -> &SendersReference {
        &self.senders_reference
    }

    pub fn customer_specified_reference(&self) -> Option<&CustomerSpecifiedReference> {
        self.customer_specified_reference.as_ref()
    }

    pub fn requested_execution_date(&self) -> Option<&RequestedExecutionDate> {
        self.requested_execution_date.as_ref()
    }

    pub fn transaction_groups(&self) -> &[TransactionGroup] {
        &self.transaction_groups
    }

    /// All fields in emission order, without the terminator.
    pub fn fields(&self) -> Vec<FieldValue> {
        let mut out = Vec::new();
        if !self.senders_reference.is_placeholder() {
            out.push(self.senders_reference.clone().into());
        }
        if let Some(f) = &self.customer_specified_reference {
            out.push(f.clone().into());
        }
        if let Some(f) = &self.requested_execution_date {
            out.push(f.clone().into());
        }
        for group in &self.transaction_groups {
            out.extend(group.fields());
        }
        out
    }

    /// Full message text, one `:TAG:` line per field, ending with the terminator line.
    pub fn content(&self) -> String {
        let mut text = String::new();
        for field in self.fields() {
            text.push_str(&field.swift_text());
            text.push('\n');
        }
        text.push_str(PAGE_TERMINATOR);
        text
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content())
    }
}

/// Sequence B tags a group may still accept, each at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupTags(u8);

impl GroupTags {
    const ORDER: [&'static str; 5] = [
        tags::INSTRUCTION_CODE,
        tags::CURRENCY_TRANSACTION_AMOUNT,
        tags::BENEFICIARY,
        tags::REMITTANCE_INFORMATION,
        tags::DETAILS_OF_CHARGES,
    ];
    const ALL: GroupTags = GroupTags(0b1_1111);

    fn bit(tag: &str) -> Option<u8> {
        Self::ORDER.iter().position(|t| *t == tag).map(|i| 1 << i)
    }

    /// Consume `tag`; false if it is not a group tag or was already seen.
    fn take(&mut self, tag: &str) -> bool {
        match Self::bit(tag) {
            Some(bit) if self.0 & bit != 0 => {
                self.0 &= !bit;
                true
            }
            _ => false,
        }
    }

    fn remaining(self) -> impl Iterator<Item = &'static str> {
        Self::ORDER
            .into_iter()
            .enumerate()
            .filter(move |(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, tag)| tag)
    }
}

/// Sequence B group under construction.
#[derive(Debug)]
struct GroupBuilder {
    transaction_reference: TransactionReference,
    remaining: GroupTags,
    instruction_code: Option<InstructionCode>,
    currency_transaction_amount: Option<CurrencyTransactionAmount>,
    beneficiary: Option<Beneficiary>,
    remittance_information: Option<RemittanceInformation>,
    details_of_charges: Option<DetailsOfCharges>,
}

impl GroupBuilder {
    fn new(transaction_reference: TransactionReference) -> Self {
        GroupBuilder {
            transaction_reference,
            remaining: GroupTags::ALL,
            instruction_code: None,
            currency_transaction_amount: None,
            beneficiary: None,
            remittance_information: None,
            details_of_charges: None,
        }
    }

    fn accept(&mut self, field: &RawField) -> Result<(), ParseError> {
        if !self.remaining.take(field.tag()) {
            let mut expected: Vec<&'static str> = self.remaining.remaining().collect();
            expected.push(tags::TRANSACTION_REFERENCE);
            expected.push(PAGE_TERMINATOR);
            return Err(unexpected(field, expected));
        }
        match decode(field)? {
            FieldValue::InstructionCode(f) => self.instruction_code = Some(f),
            FieldValue::CurrencyTransactionAmount(f) => self.currency_transaction_amount = Some(f),
            FieldValue::Beneficiary(f) => self.beneficiary = Some(f),
            FieldValue::RemittanceInformation(f) => self.remittance_information = Some(f),
            FieldValue::DetailsOfCharges(f) => self.details_of_charges = Some(f),
            other => return Err(unexpected(field, vec![other.tag()])),
        }
        Ok(())
    }

    /// Validate mandatory members; `line` is where the closing field was read.
    fn close(self, line: usize) -> Result<TransactionGroup, ParseError> {
        let context = || format!("transaction '{}'", self.transaction_reference.reference());
        let currency_transaction_amount = self.currency_transaction_amount.ok_or_else(|| {
            ParseError::MissingMandatoryField {
                line,
                tag: tags::CURRENCY_TRANSACTION_AMOUNT,
                context: context(),
            }
        })?;
        let beneficiary = self.beneficiary.ok_or_else(|| ParseError::MissingMandatoryField {
            line,
            tag: tags::BENEFICIARY,
            context: context(),
        })?;
        tracing::debug!(
            reference = self.transaction_reference.reference(),
            line,
            "transaction group closed"
        );
        Ok(TransactionGroup::new(
            self.transaction_reference,
            self.instruction_code,
            currency_transaction_amount,
            beneficiary,
            self.remittance_information,
            self.details_of_charges,
        ))
    }
}

#[derive(Debug)]
enum State {
    AwaitHeaderStart,
    AwaitCustomerReference,
    AwaitExecutionDate,
    AwaitGroupStart,
    InGroup(GroupBuilder),
}

#[derive(Debug, Default)]
struct PageBuilder {
    senders_reference: Option<SendersReference>,
    customer_specified_reference: Option<CustomerSpecifiedReference>,
    requested_execution_date: Option<RequestedExecutionDate>,
    transaction_groups: Vec<TransactionGroup>,
}

impl PageBuilder {
    fn close(mut self, state: State, line: usize) -> Result<Page, ParseError> {
        if let State::InGroup(group) = state {
            self.transaction_groups.push(group.close(line)?);
        }
        let senders_reference = self.senders_reference.ok_or_else(|| ParseError::MissingMandatoryField {
            line,
            tag: tags::SENDERS_REFERENCE,
            context: "page".to_string(),
        })?;
        tracing::debug!(groups = self.transaction_groups.len(), line, "page closed");
        Page::new(
            senders_reference,
            self.customer_specified_reference,
            self.requested_execution_date,
            self.transaction_groups,
        )
        .map_err(|_| ParseError::MissingMandatoryField {
            line,
            tag: tags::TRANSACTION_REFERENCE,
            context: "page".to_string(),
        })
    }
}

fn decode(field: &RawField) -> Result<FieldValue, ParseError> {
    FieldValue::decode(field).map_err(|source| ParseError::Field {
        line: field.line(),
        tag: field.tag().to_string(),
        source,
    })
}

fn decode_as<F: SwiftField>(field: &RawField) -> Result<F, ParseError> {
    F::from_raw(field).map_err(|source| ParseError::Field {
        line: field.line(),
        tag: field.tag().to_string(),
        source,
    })
}

fn unexpected(field: &RawField, expected: Vec<&'static str>) -> ParseError {
    ParseError::UnexpectedField {
        line: field.line(),
        found: field.tag().to_string(),
        expected,
    }
}

/// Reads MT101 pages from message text, one page per [`PageReader::read`] call.
pub struct PageReader<R> {
    tokenizer: FieldTokenizer<R>,
    config: ReaderConfig,
    failed: bool,
}

impl<'a> PageReader<&'a [u8]> {
    pub fn from_text(text: &'a str) -> Self {
        PageReader::new(text.as_bytes())
    }
}

impl<R: BufRead> PageReader<R> {
    pub fn new(reader: R) -> Self {
        PageReader::with_config(reader, ReaderConfig::default())
    }

    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        PageReader {
            tokenizer: FieldTokenizer::new(reader),
            config,
            failed: false,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read the next page. `Ok(None)` means the input is exhausted.
    pub fn read(&mut self) -> Result<Option<Page>, ParseError> {
        let mut state = State::AwaitHeaderStart;
        let mut page = PageBuilder::default();
        let mut consumed_any = false;
        loop {
            let field = match self.tokenizer.read_field()? {
                Some(field) => field,
                None if !consumed_any => return Ok(None),
                None => return page.close(state, self.tokenizer.line()).map(Some),
            };
            consumed_any = true;
            if field.is_terminator() {
                return page.close(state, field.line()).map(Some);
            }
            state = self.advance(state, &field, &mut page)?;
        }
    }

    fn advance(&self, state: State, field: &RawField, page: &mut PageBuilder) -> Result<State, ParseError> {
        match state {
            State::AwaitHeaderStart => match field.tag() {
                tags::SENDERS_REFERENCE => {
                    page.senders_reference = Some(decode_as(field)?);
                    Ok(State::AwaitCustomerReference)
                }
                tags::TRANSACTION_REFERENCE if self.config.allow_missing_senders_reference => {
                    page.senders_reference = Some(SendersReference::placeholder());
                    open_group(field)
                }
                _ => Err(unexpected(field, vec![tags::SENDERS_REFERENCE])),
            },
            State::AwaitCustomerReference => match field.tag() {
                tags::CUSTOMER_SPECIFIED_REFERENCE => {
                    page.customer_specified_reference = Some(decode_as(field)?);
                    Ok(State::AwaitExecutionDate)
                }
                tags::REQUESTED_EXECUTION_DATE => {
                    page.requested_execution_date = Some(decode_as(field)?);
                    Ok(State::AwaitGroupStart)
                }
                tags::TRANSACTION_REFERENCE => open_group(field),
                _ => Err(unexpected(
                    field,
                    vec![
                        tags::CUSTOMER_SPECIFIED_REFERENCE,
                        tags::REQUESTED_EXECUTION_DATE,
                        tags::TRANSACTION_REFERENCE,
                    ],
                )),
            },
            State::AwaitExecutionDate => match field.tag() {
                tags::REQUESTED_EXECUTION_DATE => {
                    page.requested_execution_date = Some(decode_as(field)?);
                    Ok(State::AwaitGroupStart)
                }
                tags::TRANSACTION_REFERENCE => open_group(field),
                _ => Err(unexpected(
                    field,
                    vec![tags::REQUESTED_EXECUTION_DATE, tags::TRANSACTION_REFERENCE],
                )),
            },
            State::AwaitGroupStart => match field.tag() {
                tags::TRANSACTION_REFERENCE => open_group(field),
                _ => Err(unexpected(field, vec![tags::TRANSACTION_REFERENCE])),
            },
            State::InGroup(mut group) => {
                if field.tag() == tags::TRANSACTION_REFERENCE {
                    page.transaction_groups.push(group.close(field.line())?);
                    return open_group(field);
                }
                group.accept(field)?;
                Ok(State::InGroup(group))
            }
        }
    }
}

fn open_group(field: &RawField) -> Result<State, ParseError> {
    Ok(State::InGroup(GroupBuilder::new(decode_as(field)?)))
}

impl<R: BufRead> Iterator for PageReader<R> {
    type Item = Result<Page, ParseError>;

    /// Yields pages until the input is exhausted or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.read().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

/// Read every page of `text`.
pub fn read_pages(text: &str, config: ReaderConfig) -> Result<Vec<Page>, ParseError> {
    PageReader::with_config(text.as_bytes(), config).collect()
}
