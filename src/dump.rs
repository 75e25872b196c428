//! Format decoded pages for display (dump text). Codes are shown with their descriptions.

use crate::field::{tags, BeneficiaryOption};
use crate::page::{Page, TransactionGroup};
use crate::value::FieldValue;

/// Human-readable name of a field tag.
pub fn field_name(tag: &str) -> &'static str {
    match tag {
        tags::SENDERS_REFERENCE => "Sender's Reference",
        tags::CUSTOMER_SPECIFIED_REFERENCE => "Customer Specified Reference",
        tags::REQUESTED_EXECUTION_DATE => "Requested Execution Date",
        tags::TRANSACTION_REFERENCE => "Transaction Reference",
        tags::INSTRUCTION_CODE => "Instruction Code",
        tags::CURRENCY_TRANSACTION_AMOUNT => "Currency/Transaction Amount",
        tags::BENEFICIARY => "Beneficiary",
        tags::REMITTANCE_INFORMATION => "Remittance Information",
        tags::DETAILS_OF_CHARGES => "Details of Charges",
        _ => "Unknown",
    }
}

/// Format a field for display (one line for simple fields, indented lines for blocks).
pub fn field_to_dump(v: &FieldValue, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let head = format!("{}{} ({}):", pad, field_name(v.tag()), v.tag());
    match v {
        FieldValue::SendersReference(f) => format!("{} {}", head, f.reference()),
        FieldValue::CustomerSpecifiedReference(f) => format!("{} {}", head, f.reference()),
        FieldValue::RequestedExecutionDate(f) => format!("{} {}", head, f.date()),
        FieldValue::TransactionReference(f) => format!("{} {}", head, f.reference()),
        FieldValue::InstructionCode(f) => match f.additional_information() {
            Some(info) => format!("{} {} ({}) /{}", head, f.code(), f.code().description(), info),
            None => format!("{} {} ({})", head, f.code(), f.code().description()),
        },
        FieldValue::CurrencyTransactionAmount(f) => format!("{} {} {}", head, f.currency(), f.amount()),
        FieldValue::DetailsOfCharges(f) => format!("{} {} ({})", head, f.code(), f.code().description()),
        FieldValue::RemittanceInformation(f) => {
            let mut lines = vec![head];
            for l in f.lines() {
                lines.push(format!("{}  {}", pad, l));
            }
            lines.join("\n")
        }
        FieldValue::Beneficiary(f) => {
            let mut lines = vec![head];
            match f.option() {
                BeneficiaryOption::OptionA => {
                    if let Some(id) = f.identifier_code() {
                        lines.push(format!("{}  identifier: {}", pad, id));
                    }
                    if let Some(account) = f.account() {
                        lines.push(format!("{}  account: {}", pad, account));
                    }
                }
                BeneficiaryOption::NoOption => {
                    if let Some(account) = f.account() {
                        lines.push(format!("{}  account: {}", pad, account));
                    }
                    for l in f.name_and_address() {
                        lines.push(format!("{}  {}", pad, l));
                    }
                }
            }
            lines.join("\n")
        }
    }
}

fn group_to_dump(index: usize, group: &TransactionGroup, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let mut lines = vec![format!(
        "{}[{}] transaction {} {{",
        pad,
        index,
        group.transaction_reference().reference()
    )];
    for field in group.fields().iter().skip(1) {
        lines.push(field_to_dump(field, indent + 1));
    }
    lines.push(format!("{}}}", pad));
    lines.join("\n")
}

/// Multi-line dump of a page: header fields, then one block per transaction group.
pub fn page_to_dump(page: &Page) -> String {
    let mut lines = vec![format!("MT{} {{", page.id())];
    if !page.senders_reference().is_placeholder() {
        lines.push(field_to_dump(&page.senders_reference().clone().into(), 1));
    }
    if let Some(f) = page.customer_specified_reference() {
        lines.push(field_to_dump(&f.clone().into(), 1));
    }
    if let Some(f) = page.requested_execution_date() {
        lines.push(field_to_dump(&f.clone().into(), 1));
    }
    for (i, group) in page.transaction_groups().iter().enumerate() {
        lines.push(group_to_dump(i, group, 1));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

/// First line of field_to_dump (for one-line summaries).
pub fn field_summary_line(v: &FieldValue) -> String {
    let full = field_to_dump(v, 0);
    full.lines().next().map(|s| s.trim().to_string()).unwrap_or_default()
}
