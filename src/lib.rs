//! # swiftmt — SWIFT MT notation engine and MT101 reader
//!
//! Field formats are written in the SWIFT field-format notation, compiled with a
//! PEST grammar into a [`FormatSpec`], and used in both directions: parsing raw
//! field content into sub-field values and rendering values back to content.
//! On top of that sit the MT101 field codecs and a page reader that turns
//! message text into typed pages and back.
//!
//! ## Notation
//!
//! - `N!c`: exactly N characters of class `c`
//! - `Nc`: up to N characters
//! - `N*Mc`: up to N lines of up to M characters each
//! - `[...]`: optional group
//! - any other character: a literal separator such as `/`
//!
//! Classes: `a` letters, `n` digits, `c` letters and digits, `x` any printable
//! character, `d` decimal with a comma separator.
//!
//! ## Example message
//!
//! ```text
//! :20:REF1
//! :21:TXN1
//! :32B:EUR100,00
//! :59:/ACC1
//! NAME
//! -
//! ```
//!
//! ## Usage
//!
//! ```
//! use swiftmt::{read_pages, ReaderConfig};
//!
//! let text = ":20:REF1\n:21:TXN1\n:32B:EUR100,00\n:59:/ACC1\nNAME\n-";
//! let pages = read_pages(text, ReaderConfig::default()).expect("parse");
//! assert_eq!(pages[0].transaction_groups()[0].currency_transaction_amount().amount(), "100,00");
//! assert_eq!(pages[0].content(), text);
//! ```

pub mod ast;
pub mod dump;
pub mod field;
pub mod lint;
pub mod notation;
pub mod page;
pub mod parser;
pub mod tokenizer;
pub mod value;

pub use ast::{CharClass, FormatSpec, LengthRule, SubFieldSpec};
pub use field::{FieldError, SwiftField};
pub use notation::{Expected, FieldFormatError, SubFields};
pub use page::{read_pages, Page, PageReader, ParseError, ReaderConfig, TransactionGroup};
pub use parser::{compile, GrammarSyntaxError};
pub use tokenizer::{FieldTokenizer, RawField, TokenizerError};
pub use value::FieldValue;
