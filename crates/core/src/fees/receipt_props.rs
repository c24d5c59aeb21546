//! Property-based tests for receipt numbers.
//!
//! - Formatting then parsing yields the same school code, date and sequence.
//! - Receipts of one school sort by (date, sequence) as strings.

use chrono::NaiveDate;
use proptest::prelude::*;

use super::{MAX_SCHOOL_CODE, MAX_SEQUENCE, ReceiptNumber};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

proptest! {
    #[test]
    fn prop_receipt_parses_back(
        code in 1..=MAX_SCHOOL_CODE,
        date in date_strategy(),
        sequence in 1..=MAX_SEQUENCE,
    ) {
        let receipt = ReceiptNumber::new(code, date, sequence).unwrap();
        let text = receipt.to_string();

        prop_assert_eq!(text.len(), 18);
        prop_assert!(text.starts_with("RCP"));

        let parsed: ReceiptNumber = text.parse().unwrap();
        prop_assert_eq!(parsed.school_code(), code);
        prop_assert_eq!(parsed.date(), date);
        prop_assert_eq!(parsed.sequence(), sequence);
    }

    #[test]
    fn prop_receipts_sort_chronologically(
        code in 1..=MAX_SCHOOL_CODE,
        a in (date_strategy(), 1..=MAX_SEQUENCE),
        b in (date_strategy(), 1..=MAX_SEQUENCE),
    ) {
        let ra = ReceiptNumber::new(code, a.0, a.1).unwrap();
        let rb = ReceiptNumber::new(code, b.0, b.1).unwrap();

        prop_assert_eq!(ra.to_string().cmp(&rb.to_string()), a.cmp(&b));
    }
}
