//! Compile SWIFT field notation strings into [`FormatSpec`] using PEST.

use crate::ast::*;
use pest::Parser;
use pest_derive::Parser as PestParser;
use std::str::FromStr;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct NotationParser;

/// The notation string is not a well-formed sequence of sub-field tokens and literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid notation '{notation}': {message}")]
pub struct GrammarSyntaxError {
    pub notation: String,
    pub message: String,
}

impl GrammarSyntaxError {
    fn new(notation: &str, message: impl Into<String>) -> Self {
        GrammarSyntaxError {
            notation: notation.to_string(),
            message: message.into(),
        }
    }
}

/// Compile a notation such as `3!a15d` or `[/34x]4*35x`.
pub fn compile(source: &str) -> Result<FormatSpec, GrammarSyntaxError> {
    let pairs = NotationParser::parse(Rule::notation, source)
        .map_err(|e| GrammarSyntaxError::new(source, e.to_string()))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| GrammarSyntaxError::new(source, "empty notation"))?;

    let mut builder = SpecBuilder::new(source);
    let mut group_count = 0;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::group => {
                builder.open_group(group_count)?;
                for part in inner.into_inner() {
                    builder.element(part)?;
                }
                builder.close_group()?;
                group_count += 1;
            }
            _ => builder.element(inner)?,
        }
    }
    builder.finish()
}

impl FromStr for FormatSpec {
    type Err = GrammarSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Accumulates sub-fields and attaches literals to them.
///
/// Literals become the prefix of the next sub-field in the same scope; literals
/// left at the end of a scope become the suffix of that scope's last sub-field.
struct SpecBuilder<'a> {
    source: &'a str,
    subfields: Vec<SubFieldSpec>,
    pending: String,
    group: Option<usize>,
    group_start: usize,
}

impl<'a> SpecBuilder<'a> {
    fn new(source: &'a str) -> Self {
        SpecBuilder {
            source,
            subfields: Vec::new(),
            pending: String::new(),
            group: None,
            group_start: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> GrammarSyntaxError {
        GrammarSyntaxError::new(self.source, message)
    }

    fn last_is_top_level(&self) -> bool {
        matches!(self.subfields.last(), Some(last) if last.group.is_none())
    }

    fn element(&mut self, pair: pest::iterators::Pair<Rule>) -> Result<(), GrammarSyntaxError> {
        match pair.as_rule() {
            Rule::literal => {
                self.pending.push_str(pair.as_str());
                Ok(())
            }
            Rule::multi_line | Rule::fixed | Rule::up_to => {
                let sub = self.build_subfield(pair)?;
                self.subfields.push(sub);
                Ok(())
            }
            Rule::EOI => Ok(()),
            other => Err(self.error(format!("unexpected element {:?}", other))),
        }
    }

    fn build_subfield(&mut self, pair: pest::iterators::Pair<Rule>) -> Result<SubFieldSpec, GrammarSyntaxError> {
        let rule = pair.as_rule();
        let text = pair.as_str().to_string();
        let mut numbers = Vec::new();
        let mut class = None;
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::number => {
                    let n: usize = part
                        .as_str()
                        .parse()
                        .map_err(|_| self.error(format!("length out of range in '{}'", text)))?;
                    numbers.push(n);
                }
                Rule::char_class => {
                    class = part.as_str().chars().next().and_then(CharClass::from_letter);
                }
                _ => {}
            }
        }
        let class = class.ok_or_else(|| self.error(format!("missing character class in '{}'", text)))?;
        let (length, max_lines) = match (rule, numbers.as_slice()) {
            (Rule::multi_line, [lines, width]) => (LengthRule::UpTo(*width), Some(*lines)),
            (Rule::fixed, [n]) => (LengthRule::Fixed(*n), None),
            (Rule::up_to, [n]) => (LengthRule::UpTo(*n), None),
            _ => return Err(self.error(format!("malformed sub-field '{}'", text))),
        };
        Ok(SubFieldSpec {
            class,
            length,
            max_lines,
            group: self.group,
            prefix: std::mem::take(&mut self.pending),
            suffix: String::new(),
        })
    }

    fn open_group(&mut self, id: usize) -> Result<(), GrammarSyntaxError> {
        if !self.pending.is_empty() {
            if !self.last_is_top_level() {
                return Err(self.error(format!(
                    "literal '{}' before optional group has no preceding sub-field",
                    self.pending
                )));
            }
            let pending = std::mem::take(&mut self.pending);
            if let Some(last) = self.subfields.last_mut() {
                last.suffix.push_str(&pending);
            }
        }
        self.group = Some(id);
        self.group_start = self.subfields.len();
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), GrammarSyntaxError> {
        if self.subfields.len() == self.group_start {
            return Err(self.error("optional group without sub-field"));
        }
        if !self.pending.is_empty() {
            if let Some(last) = self.subfields.last_mut() {
                last.suffix.push_str(&self.pending);
            }
            self.pending.clear();
        }
        self.group = None;
        Ok(())
    }

    fn finish(mut self) -> Result<FormatSpec, GrammarSyntaxError> {
        if self.subfields.is_empty() {
            return Err(self.error("no sub-fields"));
        }
        if !self.pending.is_empty() {
            if !self.last_is_top_level() {
                return Err(self.error(format!("literal '{}' after optional group", self.pending)));
            }
            let pending = std::mem::take(&mut self.pending);
            if let Some(last) = self.subfields.last_mut() {
                last.suffix.push_str(&pending);
            }
        }
        Ok(FormatSpec {
            source: self.source.to_string(),
            subfields: self.subfields,
        })
    }
}
