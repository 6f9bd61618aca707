//! Batch header: counts, control field and submitter metadata

use super::layout::LINE_TERMINATOR;
use crate::config::SubmissionConfig;
use crate::domain::{BpaError, Competence, ProductionRecord, Result};

const HEADER_INDICATOR: &str = "01";
const FILE_TAG: &str = "#BPA#";
const CONTROL_BASE: u64 = 1111;

/// Width of the header line, terminator excluded
pub const HEADER_WIDTH: usize = 130;

/// Control field over the exportable records.
///
/// `1111 + (Σ procedure + quantity) mod 1111`, counting only records whose
/// procedure code and quantity are both numeric. Always in `[1111, 2221]`.
pub fn control_field(records: &[ProductionRecord]) -> u32 {
    let remainder = records
        .iter()
        .filter_map(|r| Some((r.numeric_procedure()?, r.numeric_quantity()?)))
        .fold(0u64, |acc, (procedure, quantity)| {
            (acc + procedure % CONTROL_BASE + quantity % CONTROL_BASE) % CONTROL_BASE
        });
    (CONTROL_BASE + remainder) as u32
}

/// Static submitter metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub responsible_name: String,
    pub responsible_acronym: String,
    pub responsible_document: String,
    pub destination_name: String,
    pub destination_indicator: String,
    pub format_version: String,
}

impl From<&SubmissionConfig> for Submitter {
    fn from(config: &SubmissionConfig) -> Self {
        Self {
            responsible_name: config.responsible_name.clone(),
            responsible_acronym: config.responsible_acronym.clone(),
            responsible_document: config.responsible_document.clone(),
            destination_name: config.destination_name.clone(),
            destination_indicator: config.destination_indicator.clone(),
            format_version: config.format_version.clone(),
        }
    }
}

/// Write-once summary line opening the batch file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    pub competence: Competence,
    /// Body lines plus the header itself
    pub record_count: usize,
    /// Sum of the maximum page of each category
    pub page_count: u32,
    pub control_field: u32,
    pub submitter: Submitter,
}

impl BatchHeader {
    pub fn build(
        competence: Competence,
        records: &[ProductionRecord],
        page_count: u32,
        submitter: Submitter,
    ) -> Self {
        Self {
            competence,
            record_count: records.len() + 1,
            page_count,
            control_field: control_field(records),
            submitter,
        }
    }

    /// Encodes the header line, terminator included
    ///
    /// # Errors
    ///
    /// Fails when a count does not fit its six-digit column.
    pub fn encode(&self) -> Result<String> {
        let record_count = fixed_number("record count", self.record_count as u64, 6)?;
        let page_count = fixed_number("page count", u64::from(self.page_count), 6)?;
        let control = fixed_number("control field", u64::from(self.control_field), 4)?;
        let s = &self.submitter;

        let mut line = String::with_capacity(HEADER_WIDTH + LINE_TERMINATOR.len());
        line.push_str(HEADER_INDICATOR);
        line.push_str(FILE_TAG);
        line.push_str(&format!("{:0>6}", self.competence.as_str()));
        line.push_str(&record_count);
        line.push_str(&page_count);
        line.push_str(&control);
        line.push_str(&fit_left(&s.responsible_name, 30, ' '));
        line.push_str(&fit_left(&s.responsible_acronym, 6, ' '));
        line.push_str(&fit_right(&s.responsible_document, 14, '0'));
        line.push_str(&fit_left(&s.destination_name, 40, ' '));
        line.push_str(&fit_left(&s.destination_indicator, 1, 'M'));
        line.push_str(&fit_left(&s.format_version, 10, ' '));
        line.push_str(LINE_TERMINATOR);
        Ok(line)
    }
}

fn fixed_number(name: &str, value: u64, width: usize) -> Result<String> {
    let text = format!("{value:0>width$}");
    if text.len() > width {
        return Err(BpaError::Format(format!(
            "Header {name} {value} does not fit in {width} digits"
        )));
    }
    Ok(text)
}

fn fit_left(value: &str, width: usize, pad: char) -> String {
    let mut out: String = value.chars().take(width).collect();
    let missing = width - out.chars().count();
    out.extend(std::iter::repeat(pad).take(missing));
    out
}

fn fit_right(value: &str, width: usize, pad: char) -> String {
    let kept: String = value.chars().take(width).collect();
    let missing = width - kept.chars().count();
    let mut out: String = std::iter::repeat(pad).take(missing).collect();
    out.push_str(&kept);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrgType;

    fn record(procedure: &str, quantity: &str) -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Consolidated);
        r.procedure_code = procedure.to_string();
        r.quantity = quantity.to_string();
        r
    }

    fn submitter() -> Submitter {
        Submitter::from(&SubmissionConfig {
            responsible_name: "SECRETARIA DE SAUDE".to_string(),
            responsible_acronym: "SMS".to_string(),
            responsible_document: "46523015000135".to_string(),
            destination_name: "SECRETARIA MUNICIPAL DE SAUDE".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_control_field_known_value() {
        // 301010110 + 3 + 301010064 + 2 = 602020179
        let records = vec![record("0301010110", "3"), record("0301010064", "2")];
        assert_eq!(control_field(&records), 1111 + 602020179 % 1111);
    }

    #[test]
    fn test_control_field_skips_non_numeric() {
        let records = vec![
            record("0301010110", "3"),
            record("ABPG010", "3"),
            record("0301010064", "abc"),
            record("", "1"),
        ];
        assert_eq!(control_field(&records), control_field(&records[..1]));
    }

    #[test]
    fn test_control_field_range_and_order_invariance() {
        let mut records: Vec<ProductionRecord> = (0..500)
            .map(|i| record(&format!("{:010}", 301010000 + i * 37), &(i % 90 + 1).to_string()))
            .collect();
        let forward = control_field(&records);
        records.reverse();
        let backward = control_field(&records);
        assert_eq!(forward, backward);
        assert!((1111..=2221).contains(&forward));
    }

    #[test]
    fn test_control_field_empty() {
        assert_eq!(control_field(&[]), 1111);
    }

    #[test]
    fn test_header_encoding() {
        let records = vec![record("0301010110", "3"), record("0301010064", "2")];
        let header = BatchHeader::build(
            Competence::new("202403").unwrap(),
            &records,
            3,
            submitter(),
        );
        assert_eq!(header.record_count, 3);

        let line = header.encode().unwrap();
        assert!(line.ends_with("\r\n"));
        let body = line.trim_end_matches("\r\n");
        assert_eq!(body.chars().count(), HEADER_WIDTH);
        assert!(body.starts_with("01#BPA#202403000003000003"));
        assert_eq!(&body[25..29], header.control_field.to_string());
        assert_eq!(&body[29..59], format!("{:<30}", "SECRETARIA DE SAUDE"));
        assert_eq!(&body[59..65], "SMS   ");
        assert_eq!(&body[65..79], "46523015000135");
        assert_eq!(&body[119..120], "M");
        assert_eq!(&body[120..130], "D04.01    ");
    }

    #[test]
    fn test_header_pads_short_document_with_zeros() {
        let mut s = submitter();
        s.responsible_document = "12345678909".to_string();
        let header = BatchHeader::build(Competence::new("202401").unwrap(), &[], 0, s);
        let line = header.encode().unwrap();
        assert_eq!(&line[65..79], "00012345678909");
    }

    #[test]
    fn test_header_count_overflow_is_an_error() {
        let mut header = BatchHeader::build(Competence::new("202401").unwrap(), &[], 1, submitter());
        header.record_count = 1_000_000;
        assert!(matches!(header.encode(), Err(BpaError::Format(_))));
    }
}
