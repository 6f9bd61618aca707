//! Per-field fixed-width encoding rules

use crate::domain::{Field, OrgType};

/// Declared kind of a layout column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Alphanumeric,
}

/// One column of a fixed-width layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub length: usize,
    pub kind: FieldKind,
    pub pad: char,
}

impl FieldSpec {
    pub const fn numeric(field: Field, length: usize) -> Self {
        Self {
            field,
            length,
            kind: FieldKind::Numeric,
            pad: ' ',
        }
    }

    pub const fn alpha(field: Field, length: usize) -> Self {
        Self {
            field,
            length,
            kind: FieldKind::Alphanumeric,
            pad: ' ',
        }
    }
}

/// Encodes one value into exactly `length` characters.
///
/// Rules, in order:
/// - an empty value becomes `""` for consolidated rows and `length` spaces for
///   individualized rows, then goes through the rules below
/// - page and sequence are always zero-padded on the left
/// - the address number is always right-justified with spaces
/// - numeric values in consolidated rows: quantity is zero-padded on the left,
///   other columns are left-justified with `pad`
/// - numeric values in individualized rows are right-justified with `pad`
/// - a numeric column holding a non-numeric value is blanked with spaces
/// - alphanumeric columns are left-justified with spaces
///
/// The result is cut to `length` characters.
///
/// ```
/// use bpagen::core::format::{format_field, FieldKind};
/// use bpagen::domain::{Field, OrgType};
///
/// let qty = format_field("7", 6, FieldKind::Numeric, ' ', OrgType::Consolidated, Field::Quantity);
/// assert_eq!(qty, "000007");
/// let bad = format_field("abc", 6, FieldKind::Numeric, ' ', OrgType::Consolidated, Field::Quantity);
/// assert_eq!(bad, "      ");
/// ```
pub fn format_field(
    value: &str,
    length: usize,
    kind: FieldKind,
    pad: char,
    org_type: OrgType,
    field: Field,
) -> String {
    let blank;
    let value = if value.is_empty() {
        blank = match org_type {
            OrgType::Consolidated => String::new(),
            OrgType::Individualized => " ".repeat(length),
        };
        blank.as_str()
    } else {
        value
    };

    let encoded = match kind {
        FieldKind::Numeric => match field {
            Field::Page | Field::Sequence => pad_left(value, length, '0'),
            Field::AddressNumber => pad_left(value, length, ' '),
            _ if is_numeric_like(value) => match org_type {
                OrgType::Consolidated if field == Field::Quantity => pad_left(value, length, '0'),
                OrgType::Consolidated => pad_right(value, length, pad),
                OrgType::Individualized => pad_left(value, length, pad),
            },
            _ => " ".repeat(length),
        },
        FieldKind::Alphanumeric => pad_right(value, length, ' '),
    };

    truncate(encoded, length)
}

/// Applies [`format_field`] with the column's declared length, kind and pad
pub fn format_spec(value: &str, spec: &FieldSpec, org_type: OrgType) -> String {
    format_field(value, spec.length, spec.kind, spec.pad, org_type, spec.field)
}

fn is_numeric_like(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn pad_left(value: &str, length: usize, pad: char) -> String {
    let width = value.chars().count();
    if width >= length {
        return value.to_string();
    }
    let mut out: String = std::iter::repeat(pad).take(length - width).collect();
    out.push_str(value);
    out
}

fn pad_right(value: &str, length: usize, pad: char) -> String {
    let width = value.chars().count();
    let mut out = value.to_string();
    out.extend(std::iter::repeat(pad).take(length.saturating_sub(width)));
    out
}

fn truncate(value: String, length: usize) -> String {
    if value.chars().count() <= length {
        return value;
    }
    value.chars().take(length).collect()
}
