//! Property-based tests for fee status.
//!
//! - paid equals the exact decimal sum of the structure's payments
//! - remaining + paid - excess == total, with remaining and excess never negative
//! - overpaid iff excess is positive
//! - the latest payment date is reported
//! - an installment stays due exactly while something remains

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use scholaris_shared::types::{FeeStructureId, Money, PaymentId, SchoolId, StudentId, UserId};

use super::{FeeStatus, FeeStructure, Payment, PaymentMode};

/// Strategy to generate positive amounts (0.01 to 100,000.00).
fn amount() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64).prop_map(|paise| Money::new(Decimal::new(paise, 2)))
}

fn structure(total: Money) -> FeeStructure {
    FeeStructure {
        id: FeeStructureId::new(),
        school_id: SchoolId::new(),
        student_id: StudentId::new(),
        academic_year: "2024-25".into(),
        total_fee: total,
        due_dates: Vec::new(),
        class_fee_structure_id: None,
        version: 1,
        is_active: true,
        created_at: Utc::now(),
    }
}

fn payment(structure: &FeeStructure, amount: Money, day: u32) -> Payment {
    Payment {
        id: PaymentId::new(),
        receipt_no: String::new(),
        school_id: structure.school_id,
        student_id: structure.student_id,
        fee_structure_id: structure.id,
        amount,
        mode: PaymentMode::Cash,
        reference: None,
        remarks: None,
        paid_on: NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default(),
        recorded_by: UserId::new(),
        recorded_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn prop_status_balances(
        total in amount(),
        paid in proptest::collection::vec((amount(), 1u32..=28), 0..20),
    ) {
        let s = structure(total);
        let payments: Vec<Payment> = paid.iter().map(|&(a, d)| payment(&s, a, d)).collect();
        let status = FeeStatus::compute(&s, &payments);

        let expected_paid: Money = paid.iter().map(|&(a, _)| a).sum();
        prop_assert_eq!(status.paid_amount, expected_paid);
        prop_assert!(status.remaining_amount >= Money::ZERO);
        prop_assert!(status.excess_amount >= Money::ZERO);
        prop_assert_eq!(
            status.remaining_amount + status.paid_amount - status.excess_amount,
            status.total_fee
        );
        prop_assert_eq!(status.overpaid, status.excess_amount.is_positive());
        prop_assert_eq!(
            status.last_payment_date,
            payments.iter().map(|p| p.paid_on).max()
        );
        prop_assert_eq!(status.next_due_date, None);
    }

    #[test]
    fn prop_next_due_iff_remaining(
        total in amount(),
        paid in proptest::collection::vec(amount(), 0..6),
        n in 1usize..=12,
    ) {
        let mut s = structure(total);
        s.due_dates = (1..=n)
            .map(|m| NaiveDate::from_ymd_opt(2024, u32::try_from(m).unwrap_or(1), 10).unwrap_or_default())
            .collect();
        let payments: Vec<Payment> = paid.iter().map(|&a| payment(&s, a, 1)).collect();
        let status = FeeStatus::compute(&s, &payments);

        prop_assert_eq!(status.next_due_date.is_some(), status.remaining_amount.is_positive());
        let late = status.clone().as_of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default());
        prop_assert_eq!(late.overdue, status.remaining_amount.is_positive());
        let early = status.as_of(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default());
        prop_assert!(!early.overdue);
    }
}
