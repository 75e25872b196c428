//! Parse field content into sub-field values and render values back, driven by a [`FormatSpec`].
//!
//! Matching rules:
//!
//! - `N!c` consumes exactly N characters of class `c`, `Nc` between 1 and N.
//! - `N*Mc` consumes 1 to N whole lines of 1 to M characters each; when it is not
//!   the first thing in the content it starts on a fresh line.
//! - A `[...]` group whose first sub-field has a literal prefix is present exactly
//!   when the content continues with that prefix; a group without a leading literal
//!   is tried present first, then absent.
//! - Variable-length sub-fields are matched greedily and shortened on backtrack.
//!
//! Values come back positionally, one per sub-field: `None` marks an absent
//! optional sub-field, and multi-line values keep their lines joined by `\n`.

use crate::ast::{CharClass, FormatSpec, LengthRule, SubFieldSpec};
use std::fmt;

/// What the engine expected at the failing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// A sub-field, by notation token (e.g. `3!a`).
    SubField(String),
    /// A literal separator such as `/`.
    Literal(String),
    /// A line break before a multi-line sub-field.
    LineBreak,
    /// End of content.
    End,
    /// A value for a mandatory sub-field (render side).
    Value { index: usize, token: String },
    /// No further values: more values were given than the notation has sub-fields.
    NoMoreValues { given: usize },
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::SubField(token) => write!(f, "sub-field {}", token),
            Expected::Literal(lit) => write!(f, "literal '{}'", lit),
            Expected::LineBreak => write!(f, "line break"),
            Expected::End => write!(f, "end of content"),
            Expected::Value { index, token } => {
                write!(f, "value for mandatory sub-field #{} ({})", index + 1, token)
            }
            Expected::NoMoreValues { given } => write!(f, "no further values (got {})", given),
        }
    }
}

/// Content (or a value being rendered) violates the notation.
///
/// `position` is a character offset into the content being parsed, or into the
/// output rendered so far.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("content does not match '{notation}': expected {expected} at position {position}")]
pub struct FieldFormatError {
    pub notation: String,
    pub position: usize,
    pub expected: Expected,
}

/// Ordered sub-field values, one slot per sub-field of the notation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubFields(Vec<Option<String>>);

impl SubFields {
    pub fn new(values: Vec<Option<String>>) -> Self {
        SubFields(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|v| v.as_deref())
    }

    /// Lines of a multi-line value; empty when the sub-field is absent.
    pub fn lines(&self, index: usize) -> Vec<&str> {
        self.get(index).map(|v| v.split('\n').collect()).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.0.iter().map(|v| v.as_deref())
    }

    pub fn into_inner(self) -> Vec<Option<String>> {
        self.0
    }
}

impl From<Vec<Option<String>>> for SubFields {
    fn from(values: Vec<Option<String>>) -> Self {
        SubFields(values)
    }
}

impl FromIterator<Option<String>> for SubFields {
    fn from_iter<I: IntoIterator<Item = Option<String>>>(iter: I) -> Self {
        SubFields(iter.into_iter().collect())
    }
}

impl FormatSpec {
    /// Split `content` into one value per sub-field.
    pub fn parse(&self, content: &str) -> Result<SubFields, FieldFormatError> {
        let mut matcher = Matcher {
            spec: self,
            chars: content.chars().collect(),
            furthest: None,
        };
        let mut out = Vec::with_capacity(self.subfields.len());
        if matcher.step(0, 0, &mut out) {
            return Ok(SubFields(out));
        }
        let (position, expected) = matcher.furthest.unwrap_or((0, Expected::End));
        Err(self.error(position, expected))
    }

    /// Render values into content. Absent optional groups are omitted together
    /// with their literals.
    pub fn render(&self, values: &SubFields) -> Result<String, FieldFormatError> {
        if values.len() > self.subfields.len() {
            return Err(self.error(0, Expected::NoMoreValues { given: values.len() }));
        }
        let mut out = String::new();
        let mut index = 0;
        while index < self.subfields.len() {
            if self.opens_group(index) {
                let end = self.group_end(index);
                let present = (index..end).any(|k| values.get(k).is_some());
                if present {
                    for k in index..end {
                        self.render_one(k, values.get(k), &mut out)?;
                    }
                }
                index = end;
            } else {
                self.render_one(index, values.get(index), &mut out)?;
                index += 1;
            }
        }
        Ok(out)
    }

    fn render_one(&self, index: usize, value: Option<&str>, out: &mut String) -> Result<(), FieldFormatError> {
        let sub = &self.subfields[index];
        let start = out.chars().count();
        let value = value.ok_or_else(|| {
            self.error(start, Expected::Value { index, token: sub.token() })
        })?;
        if sub.is_multi_line() && !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&sub.prefix);
        let offset = out.chars().count();
        check_value(sub, value).map_err(|at| self.error(offset + at, Expected::SubField(sub.token())))?;
        out.push_str(value);
        out.push_str(&sub.suffix);
        Ok(())
    }

    fn error(&self, position: usize, expected: Expected) -> FieldFormatError {
        FieldFormatError {
            notation: self.source.clone(),
            position,
            expected,
        }
    }
}

/// Offset of the first offending character, if `value` violates `sub`.
fn check_value(sub: &SubFieldSpec, value: &str) -> Result<(), usize> {
    match sub.max_lines {
        Some(max_lines) => {
            let mut offset: usize = 0;
            for (n, line) in value.split('\n').enumerate() {
                if n >= max_lines {
                    return Err(offset.saturating_sub(1));
                }
                check_line(sub.class, sub.length, line).map_err(|at| offset + at)?;
                offset += line.chars().count() + 1;
            }
            Ok(())
        }
        None => check_line(sub.class, sub.length, value),
    }
}

fn check_line(class: CharClass, length: LengthRule, line: &str) -> Result<(), usize> {
    let chars: Vec<char> = line.chars().collect();
    if let Some(bad) = chars.iter().position(|&c| !class.accepts(c)) {
        return Err(bad);
    }
    if chars.len() > length.max() {
        return Err(length.max());
    }
    if chars.len() < length.min() {
        return Err(chars.len());
    }
    if class == CharClass::Decimal {
        return check_decimal(&chars);
    }
    Ok(())
}

/// A decimal starts with a digit and carries at most one comma.
fn check_decimal(chars: &[char]) -> Result<(), usize> {
    if chars.first() == Some(&',') {
        return Err(0);
    }
    let commas: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == ',')
        .map(|(i, _)| i)
        .collect();
    match commas.get(1) {
        Some(&second) => Err(second),
        None => Ok(()),
    }
}

struct Matcher<'a> {
    spec: &'a FormatSpec,
    chars: Vec<char>,
    /// Deepest failure seen so far, reported when no alternative matches.
    furthest: Option<(usize, Expected)>,
}

impl<'a> Matcher<'a> {
    fn fail(&mut self, position: usize, expected: Expected) {
        let deeper = self.furthest.as_ref().map_or(true, |(p, _)| position > *p);
        if deeper {
            self.furthest = Some((position, expected));
        }
    }

    fn starts_with(&self, pos: usize, literal: &str) -> bool {
        let mut i = pos;
        for c in literal.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn step(&mut self, index: usize, pos: usize, out: &mut Vec<Option<String>>) -> bool {
        let spec = self.spec;
        if index == spec.subfields.len() {
            if pos == self.chars.len() {
                return true;
            }
            self.fail(pos, Expected::End);
            return false;
        }
        if !spec.opens_group(index) {
            return self.step_present(index, pos, out);
        }

        let end = spec.group_end(index);
        let lead = &spec.subfields[index].prefix;
        let try_present = lead.is_empty() || self.starts_with(pos, lead);
        let try_absent = lead.is_empty() || !try_present;
        if try_present && self.step_present(index, pos, out) {
            return true;
        }
        if try_absent {
            let mark = out.len();
            out.extend((index..end).map(|_| None));
            if self.step(end, pos, out) {
                return true;
            }
            out.truncate(mark);
        }
        false
    }

    fn step_present(&mut self, index: usize, pos: usize, out: &mut Vec<Option<String>>) -> bool {
        let spec = self.spec;
        let sub = &spec.subfields[index];
        for (end, value) in self.candidates(sub, pos) {
            out.push(Some(value));
            if self.step(index + 1, end, out) {
                return true;
            }
            out.pop();
        }
        false
    }

    /// Possible (end position, value) matches of `sub` at `pos`, preferred first.
    fn candidates(&mut self, sub: &SubFieldSpec, pos: usize) -> Vec<(usize, String)> {
        let mut p = pos;
        if sub.is_multi_line() && pos > 0 {
            if self.chars.get(p) != Some(&'\n') {
                self.fail(p, Expected::LineBreak);
                return Vec::new();
            }
            p += 1;
        }
        if !self.starts_with(p, &sub.prefix) {
            self.fail(p, Expected::Literal(sub.prefix.clone()));
            return Vec::new();
        }
        p += sub.prefix.chars().count();

        let bodies = match sub.max_lines {
            Some(max_lines) => self.line_ends(sub, p, max_lines),
            None => self.run_ends(sub, p),
        };

        let suffix_len = sub.suffix.chars().count();
        let mut out = Vec::with_capacity(bodies.len());
        for end in bodies {
            if !self.starts_with(end, &sub.suffix) {
                self.fail(end, Expected::Literal(sub.suffix.clone()));
                continue;
            }
            let value: String = self.chars[p..end].iter().collect();
            out.push((end + suffix_len, value));
        }
        out
    }

    /// Body end positions for a single-line sub-field, longest first.
    fn run_ends(&mut self, sub: &SubFieldSpec, p: usize) -> Vec<usize> {
        let max = sub.length.max();
        let run = self.chars[p.min(self.chars.len())..]
            .iter()
            .take(max)
            .take_while(|&&c| sub.class.accepts(c))
            .count();
        let lengths: Vec<usize> = match sub.length {
            LengthRule::Fixed(n) if run >= n => vec![n],
            LengthRule::UpTo(_) if run >= 1 => (1..=run).rev().collect(),
            _ => Vec::new(),
        };
        let ends: Vec<usize> = lengths
            .into_iter()
            .filter(|&len| sub.class != CharClass::Decimal || check_decimal(&self.chars[p..p + len]).is_ok())
            .map(|len| p + len)
            .collect();
        if ends.is_empty() {
            self.fail(p + run, Expected::SubField(sub.token()));
        }
        ends
    }

    /// Body end positions for a multi-line sub-field, most lines first.
    fn line_ends(&mut self, sub: &SubFieldSpec, p: usize, max_lines: usize) -> Vec<usize> {
        let mut ends = Vec::new();
        let mut q = p;
        while ends.len() < max_lines {
            let line_end = self.chars[q.min(self.chars.len())..]
                .iter()
                .position(|&c| c == '\n')
                .map_or(self.chars.len(), |i| q + i);
            if let Err(at) = check_line(sub.class, sub.length, &self.chars[q..line_end].iter().collect::<String>()) {
                self.fail(q + at, Expected::SubField(sub.token()));
                break;
            }
            ends.push(line_end);
            if line_end >= self.chars.len() {
                break;
            }
            q = line_end + 1;
        }
        ends.reverse();
        ends
    }
}
