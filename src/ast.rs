//! Compiled form of a SWIFT field notation (e.g. `3!a15d`, `[/34x]4*35x`).

use std::fmt;

/// Character class of a sub-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// `a`: upper-case letters.
    Alpha,
    /// `n`: digits.
    Digit,
    /// `c`: upper-case letters and digits.
    Alnum,
    /// `x`: any printable character including space (no line breaks).
    Any,
    /// `d`: decimal amount, digits with at most one comma.
    Decimal,
}

impl CharClass {
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'a' => Some(CharClass::Alpha),
            'n' => Some(CharClass::Digit),
            'c' => Some(CharClass::Alnum),
            'x' => Some(CharClass::Any),
            'd' => Some(CharClass::Decimal),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            CharClass::Alpha => 'a',
            CharClass::Digit => 'n',
            CharClass::Alnum => 'c',
            CharClass::Any => 'x',
            CharClass::Decimal => 'd',
        }
    }

    /// Whether a single character belongs to the class.
    pub fn accepts(self, c: char) -> bool {
        match self {
            CharClass::Alpha => c.is_ascii_uppercase(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Alnum => c.is_ascii_uppercase() || c.is_ascii_digit(),
            CharClass::Any => c != '\n' && c != '\r' && !c.is_control(),
            CharClass::Decimal => c.is_ascii_digit() || c == ',',
        }
    }
}

/// Length rule of a sub-field (or of each line of a multi-line sub-field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthRule {
    /// `N!`: exactly N characters.
    Fixed(usize),
    /// `N`: 1 to N characters, no padding.
    UpTo(usize),
}

impl LengthRule {
    pub fn max(self) -> usize {
        match self {
            LengthRule::Fixed(n) | LengthRule::UpTo(n) => n,
        }
    }

    pub fn min(self) -> usize {
        match self {
            LengthRule::Fixed(n) => n,
            LengthRule::UpTo(_) => 1,
        }
    }
}

/// One positional component of a field notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFieldSpec {
    pub class: CharClass,
    pub length: LengthRule,
    /// `N*M`: up to N lines of M characters each.
    pub max_lines: Option<usize>,
    /// Index of the enclosing `[...]` group, if any.
    pub group: Option<usize>,
    /// Literal characters written before the value (e.g. `/`).
    pub prefix: String,
    /// Literal characters written after the value, up to the end of the enclosing scope.
    pub suffix: String,
}

impl SubFieldSpec {
    pub fn is_optional(&self) -> bool {
        self.group.is_some()
    }

    pub fn is_multi_line(&self) -> bool {
        self.max_lines.is_some()
    }

    /// Notation token without literals, e.g. `3!a`, `15d`, `4*35x`.
    pub fn token(&self) -> String {
        match (self.max_lines, self.length) {
            (Some(lines), length) => format!("{}*{}{}", lines, length.max(), self.class.letter()),
            (None, LengthRule::Fixed(n)) => format!("{}!{}", n, self.class.letter()),
            (None, LengthRule::UpTo(n)) => format!("{}{}", n, self.class.letter()),
        }
    }
}

/// Compiled notation: ordered sub-field specs plus their literal separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub source: String,
    pub subfields: Vec<SubFieldSpec>,
}

impl FormatSpec {
    pub fn len(&self) -> usize {
        self.subfields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subfields.is_empty()
    }

    /// Whether sub-field `index` is the first one of its optional group.
    pub fn opens_group(&self, index: usize) -> bool {
        match self.subfields[index].group {
            Some(g) => index == 0 || self.subfields[index - 1].group != Some(g),
            None => false,
        }
    }

    /// Index one past the last sub-field of the group that starts at `index`.
    pub fn group_end(&self, index: usize) -> usize {
        let group = self.subfields[index].group;
        let mut end = index;
        while end < self.subfields.len() && self.subfields[end].group == group {
            end += 1;
        }
        end
    }
}

impl fmt::Display for FormatSpec {
    /// Re-derives the notation string from the compiled sub-fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sub) in self.subfields.iter().enumerate() {
            if self.opens_group(i) {
                f.write_str("[")?;
            }
            write!(f, "{}{}{}", sub.prefix, sub.token(), sub.suffix)?;
            let closes_group = sub.group.is_some()
                && self.subfields.get(i + 1).map(|next| next.group) != Some(sub.group);
            if closes_group {
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}
