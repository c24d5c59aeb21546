//! Receipt numbers: `RCP` + school code (3 digits) + `yyyymmdd` + sequence (4 digits).
//!
//! Every part has a fixed width, so a receipt always parses back into the
//! same school code, date and sequence.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

const PREFIX: &str = "RCP";
const CODE_WIDTH: usize = 3;
const DATE_WIDTH: usize = 8;
const SEQUENCE_WIDTH: usize = 4;
const RECEIPT_LEN: usize = PREFIX.len() + CODE_WIDTH + DATE_WIDTH + SEQUENCE_WIDTH;

/// Largest school code that fits the receipt format.
pub const MAX_SCHOOL_CODE: i32 = 999;

/// Receipts a school can issue per day.
pub const MAX_SEQUENCE: u32 = 9999;

/// Receipt construction and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    /// School code outside `1..=999`.
    #[error("School code {0} does not fit a receipt number")]
    SchoolCodeOutOfRange(i32),

    /// The school already issued `MAX_SEQUENCE` receipts on this day.
    #[error("Receipt sequence exhausted for {date}")]
    SequenceExhausted {
        /// The exhausted business day.
        date: NaiveDate,
    },

    /// Sequence zero or above `MAX_SEQUENCE`.
    #[error("Receipt sequence {0} out of range")]
    SequenceOutOfRange(u32),

    /// String is not a receipt number.
    #[error("Malformed receipt number: {0}")]
    Malformed(String),
}

/// A parsed receipt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReceiptNumber {
    school_code: i32,
    date: NaiveDate,
    sequence: u32,
}

impl ReceiptNumber {
    /// Builds a receipt number, checking every part fits its width.
    pub fn new(school_code: i32, date: NaiveDate, sequence: u32) -> Result<Self, ReceiptError> {
        if !(1..=MAX_SCHOOL_CODE).contains(&school_code) {
            return Err(ReceiptError::SchoolCodeOutOfRange(school_code));
        }
        if sequence > MAX_SEQUENCE {
            return Err(ReceiptError::SequenceExhausted { date });
        }
        if sequence == 0 {
            return Err(ReceiptError::SequenceOutOfRange(sequence));
        }
        Ok(Self {
            school_code,
            date,
            sequence,
        })
    }

    /// Issuing school's code.
    #[must_use]
    pub const fn school_code(&self) -> i32 {
        self.school_code
    }

    /// Business day of issue.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Position within the school's day, from 1.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{:03}{}{:04}",
            self.school_code,
            self.date.format("%Y%m%d"),
            self.sequence
        )
    }
}

impl FromStr for ReceiptNumber {
    type Err = ReceiptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReceiptError::Malformed(s.to_string());

        let digits = s.strip_prefix(PREFIX).ok_or_else(malformed)?;
        if s.len() != RECEIPT_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let (code, rest) = digits.split_at(CODE_WIDTH);
        let (date, sequence) = rest.split_at(DATE_WIDTH);

        let school_code = code.parse().map_err(|_| malformed())?;
        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| malformed())?;
        let sequence = sequence.parse().map_err(|_| malformed())?;

        Self::new(school_code, date, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format() {
        let receipt = ReceiptNumber::new(7, day(2024, 6, 3), 1).unwrap();
        assert_eq!(receipt.to_string(), "RCP007202406030001");
    }

    #[test]
    fn test_parse() {
        let receipt: ReceiptNumber = "RCP123202412319999".parse().unwrap();
        assert_eq!(receipt.school_code(), 123);
        assert_eq!(receipt.date(), day(2024, 12, 31));
        assert_eq!(receipt.sequence(), 9999);
    }

    #[test]
    fn test_bounds() {
        let date = day(2024, 6, 3);
        assert_eq!(
            ReceiptNumber::new(1, date, MAX_SEQUENCE + 1),
            Err(ReceiptError::SequenceExhausted { date })
        );
        assert_eq!(
            ReceiptNumber::new(1000, date, 1),
            Err(ReceiptError::SchoolCodeOutOfRange(1000))
        );
        assert_eq!(
            ReceiptNumber::new(0, date, 1),
            Err(ReceiptError::SchoolCodeOutOfRange(0))
        );
        assert!(ReceiptNumber::new(1, date, 0).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "RCP",
            "XYZ007202406030001",
            "RCP00720240603001",
            "RCP0072024060300011",
            "RCP00720240631 001",
            "RCP007202413030001",
            "RCP000202406030001",
        ] {
            assert!(bad.parse::<ReceiptNumber>().is_err(), "{bad} should not parse");
        }
    }
}
