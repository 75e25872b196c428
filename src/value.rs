//! Tagged union over all MT101 field values.

use crate::field::*;
use crate::tokenizer::RawField;

/// A decoded field of any supported tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    SendersReference(SendersReference),
    CustomerSpecifiedReference(CustomerSpecifiedReference),
    RequestedExecutionDate(RequestedExecutionDate),
    TransactionReference(TransactionReference),
    InstructionCode(InstructionCode),
    CurrencyTransactionAmount(CurrencyTransactionAmount),
    Beneficiary(Beneficiary),
    RemittanceInformation(RemittanceInformation),
    DetailsOfCharges(DetailsOfCharges),
}

impl FieldValue {
    /// Decode a raw field with the codec registered for its tag.
    pub fn decode(field: &RawField) -> Result<Self, FieldError> {
        let value = match field.tag() {
            tags::SENDERS_REFERENCE => SendersReference::from_raw(field)?.into(),
            tags::CUSTOMER_SPECIFIED_REFERENCE => CustomerSpecifiedReference::from_raw(field)?.into(),
            tags::REQUESTED_EXECUTION_DATE => RequestedExecutionDate::from_raw(field)?.into(),
            tags::TRANSACTION_REFERENCE => TransactionReference::from_raw(field)?.into(),
            tags::INSTRUCTION_CODE => InstructionCode::from_raw(field)?.into(),
            tags::CURRENCY_TRANSACTION_AMOUNT => CurrencyTransactionAmount::from_raw(field)?.into(),
            tags::BENEFICIARY => Beneficiary::from_raw(field)?.into(),
            tags::REMITTANCE_INFORMATION => RemittanceInformation::from_raw(field)?.into(),
            tags::DETAILS_OF_CHARGES => DetailsOfCharges::from_raw(field)?.into(),
            other => return Err(FieldError::UnknownTag(other.to_string())),
        };
        Ok(value)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FieldValue::SendersReference(f) => f.tag(),
            FieldValue::CustomerSpecifiedReference(f) => f.tag(),
            FieldValue::RequestedExecutionDate(f) => f.tag(),
            FieldValue::TransactionReference(f) => f.tag(),
            FieldValue::InstructionCode(f) => f.tag(),
            FieldValue::CurrencyTransactionAmount(f) => f.tag(),
            FieldValue::Beneficiary(f) => f.tag(),
            FieldValue::RemittanceInformation(f) => f.tag(),
            FieldValue::DetailsOfCharges(f) => f.tag(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            FieldValue::SendersReference(f) => f.content(),
            FieldValue::CustomerSpecifiedReference(f) => f.content(),
            FieldValue::RequestedExecutionDate(f) => f.content(),
            FieldValue::TransactionReference(f) => f.content(),
            FieldValue::InstructionCode(f) => f.content(),
            FieldValue::CurrencyTransactionAmount(f) => f.content(),
            FieldValue::Beneficiary(f) => f.content(),
            FieldValue::RemittanceInformation(f) => f.content(),
            FieldValue::DetailsOfCharges(f) => f.content(),
        }
    }

    /// `:TAG:content`
    pub fn swift_text(&self) -> String {
        format!(":{}:{}", self.tag(), self.content())
    }
}

macro_rules! impl_from_field {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for FieldValue {
                fn from(f: $variant) -> Self {
                    FieldValue::$variant(f)
                }
            }
        )*
    };
}

impl_from_field!(
    SendersReference,
    CustomerSpecifiedReference,
    RequestedExecutionDate,
    TransactionReference,
    InstructionCode,
    CurrencyTransactionAmount,
    Beneficiary,
    RemittanceInformation,
    DetailsOfCharges,
);
