//! Installment schedules.
//!
//! A fee with `n` due dates is split into `n` installments of equal size,
//! truncated to the paisa, with the last one absorbing the remainder.
//! Payments settle installments in due-date order.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use scholaris_shared::types::Money;
use scholaris_shared::types::money::MONEY_SCALE;

/// One slice of a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installment {
    /// When this slice falls due.
    pub due_date: NaiveDate,
    /// Amount of this slice.
    pub amount: Money,
}

/// Splits `total` across `due_dates`, which must be ascending.
#[must_use]
pub fn installments(total: Money, due_dates: &[NaiveDate]) -> Vec<Installment> {
    let Some((&last, rest)) = due_dates.split_last() else {
        return Vec::new();
    };
    let share = Money::new(
        (total.amount() / Decimal::from(due_dates.len()))
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero),
    );

    let mut allotted = Money::ZERO;
    let mut schedule = Vec::with_capacity(due_dates.len());
    for &due_date in rest {
        schedule.push(Installment {
            due_date,
            amount: share,
        });
        allotted += share;
    }
    schedule.push(Installment {
        due_date: last,
        amount: total - allotted,
    });
    schedule
}

/// Due date of the first installment that `paid` does not fully cover.
///
/// `None` when there is no schedule or the fee is paid in full.
#[must_use]
pub fn next_due_date(total: Money, due_dates: &[NaiveDate], paid: Money) -> Option<NaiveDate> {
    let mut cumulative = Money::ZERO;
    installments(total, due_dates)
        .into_iter()
        .find(|installment| {
            cumulative += installment.amount;
            paid < cumulative
        })
        .map(|installment| installment.due_date)
}

/// Sorts due dates ascending. Returns `None` if any date repeats.
#[must_use]
pub fn normalize_due_dates(mut due_dates: Vec<NaiveDate>) -> Option<Vec<NaiveDate>> {
    due_dates.sort_unstable();
    let before = due_dates.len();
    due_dates.dedup();
    (due_dates.len() == before).then_some(due_dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_last_installment_takes_remainder() {
        let schedule = installments(Money::new(dec!(1000)), &[day(4, 10), day(8, 10), day(12, 10)]);
        let amounts: Vec<Decimal> = schedule.iter().map(|i| i.amount.amount()).collect();
        assert_eq!(amounts, vec![dec!(333.33), dec!(333.33), dec!(333.34)]);
        assert_eq!(schedule[2].due_date, day(12, 10));
    }

    #[test]
    fn test_no_dates_no_schedule() {
        assert!(installments(Money::new(dec!(500)), &[]).is_empty());
        assert_eq!(next_due_date(Money::new(dec!(500)), &[], Money::ZERO), None);
    }

    #[test]
    fn test_next_due_date_moves_with_payments() {
        let total = Money::new(dec!(30000));
        let dates = [day(4, 10), day(8, 10), day(12, 10)];

        assert_eq!(next_due_date(total, &dates, Money::ZERO), Some(day(4, 10)));
        assert_eq!(next_due_date(total, &dates, Money::new(dec!(9999.99))), Some(day(4, 10)));
        assert_eq!(next_due_date(total, &dates, Money::new(dec!(10000))), Some(day(8, 10)));
        assert_eq!(next_due_date(total, &dates, Money::new(dec!(29999.99))), Some(day(12, 10)));
        assert_eq!(next_due_date(total, &dates, total), None);
        assert_eq!(next_due_date(total, &dates, Money::new(dec!(45000))), None);
    }

    #[test]
    fn test_normalize_due_dates() {
        assert_eq!(
            normalize_due_dates(vec![day(8, 10), day(4, 10)]),
            Some(vec![day(4, 10), day(8, 10)])
        );
        assert_eq!(normalize_due_dates(vec![day(4, 10), day(4, 10)]), None);
        assert_eq!(normalize_due_dates(Vec::new()), Some(Vec::new()));
    }

    proptest! {
        #[test]
        fn prop_installments_sum_to_total(paise in 1i64..1_000_000_000_000i64, n in 1usize..=12) {
            let total = Money::new(Decimal::new(paise, 2));
            let dates: Vec<NaiveDate> = (0..n)
                .map(|i| day(1, 1) + chrono::Days::new(30 * i as u64))
                .collect();
            let schedule = installments(total, &dates);

            prop_assert_eq!(schedule.len(), n);
            prop_assert_eq!(schedule.iter().map(|i| i.amount).sum::<Money>(), total);
            prop_assert!(schedule.iter().all(|i| i.amount >= Money::ZERO && i.amount.has_valid_scale()));
            prop_assert!(schedule[..n - 1].iter().all(|i| i.amount == schedule[0].amount));
            prop_assert!(schedule[n - 1].amount >= schedule[0].amount);
        }
    }
}
