use super::*;
use rust_decimal_macros::dec;

#[test]
fn test_money_zero() {
    assert!(Money::ZERO.is_zero());
    assert!(!Money::ZERO.is_positive());
    assert_eq!(Money::default(), Money::ZERO);
}

#[test]
fn test_money_positive() {
    assert!(Money::new(dec!(0.01)).is_positive());
    assert!(!Money::new(dec!(-5)).is_positive());
}

#[test]
fn test_money_scale() {
    assert!(Money::new(dec!(100)).has_valid_scale());
    assert!(Money::new(dec!(100.50)).has_valid_scale());
    assert!(Money::new(dec!(100.500)).has_valid_scale());
    assert!(!Money::new(dec!(100.505)).has_valid_scale());
}

#[test]
fn test_money_limit() {
    assert_eq!(Money::MAX.amount(), dec!(9999999999.99));
    assert_eq!(Money::MAX.to_string(), "9999999999.99");
    assert!(Money::MAX.is_within_limit());
    assert!(Money::new(dec!(5000)).is_within_limit());
    assert!(!Money::new(dec!(10000000000.00)).is_within_limit());
    assert!(!Money::new(rust_decimal::Decimal::MAX).is_within_limit());
}

#[test]
fn test_money_arithmetic() {
    let total: Money = [dec!(5000), dec!(45000), dec!(100)]
        .into_iter()
        .map(Money::new)
        .sum();
    assert_eq!(total, Money::new(dec!(50100)));

    let mut running = Money::new(dec!(10));
    running += Money::new(dec!(2.50));
    assert_eq!(running.amount(), dec!(12.50));
    assert_eq!((running - Money::new(dec!(0.50))).amount(), dec!(12.00));
}

#[test]
fn test_money_saturating_sub() {
    let total = Money::new(dec!(50000));
    assert_eq!(total.saturating_sub(Money::new(dec!(5000))), Money::new(dec!(45000)));
    assert_eq!(total.saturating_sub(Money::new(dec!(50100))), Money::ZERO);
}

#[test]
fn test_money_display_uses_two_decimals() {
    assert_eq!(Money::new(dec!(45000)).to_string(), "45000.00");
    assert_eq!(Money::new(dec!(12.5)).to_string(), "12.50");
}
