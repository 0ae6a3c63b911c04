mod utils;

use auction_bidding_client::domain::{validate_bid_input, BidInputError};
use utils::usd;

#[test]
fn accepts_the_minimum_increment() {
    // Current price $10.00, so $10.01 is the lowest legal bid
    let accepted = validate_bid_input("10.01", usd(1000)).unwrap();
    assert_eq!(accepted, usd(1001));
}

#[test]
fn rejects_a_bid_equal_to_the_current_price() {
    let rejected = validate_bid_input("10.00", usd(1000)).unwrap_err();
    assert_eq!(rejected, BidInputError::BelowMinimum(usd(1001)));
    assert_eq!(rejected.to_string(), "Bid must be at least $10.01");
}

#[test]
fn rejects_blank_input() {
    assert_eq!(
        validate_bid_input("", usd(1000)).unwrap_err(),
        BidInputError::Missing
    );
    assert_eq!(
        validate_bid_input("   ", usd(1000)).unwrap_err(),
        BidInputError::Missing
    );
}

#[test]
fn rejects_non_numeric_input() {
    assert_eq!(
        validate_bid_input("ten dollars", usd(1000)).unwrap_err(),
        BidInputError::NotANumber
    );
    // f64 parsing accepts "nan"; it is still not a usable bid
    assert_eq!(
        validate_bid_input("nan", usd(1000)).unwrap_err(),
        BidInputError::NotANumber
    );
    assert_eq!(
        validate_bid_input("inf", usd(1000)).unwrap_err(),
        BidInputError::NotANumber
    );
}

#[test]
fn rejects_zero_and_negative_amounts() {
    assert_eq!(
        validate_bid_input("0", usd(1000)).unwrap_err(),
        BidInputError::NotPositive
    );
    assert_eq!(
        validate_bid_input("-5", usd(1000)).unwrap_err(),
        BidInputError::NotPositive
    );
}

#[test]
fn rejects_amounts_over_the_sanity_ceiling() {
    // 100x the current price is the cutoff; exactly 100x still passes
    assert_eq!(
        validate_bid_input("1000.00", usd(1000)).unwrap(),
        usd(100_000)
    );
    assert_eq!(
        validate_bid_input("1000.01", usd(1000)).unwrap_err(),
        BidInputError::UnreasonablyHigh
    );
}

#[test]
fn rejects_more_than_two_decimal_places() {
    assert_eq!(
        validate_bid_input("10.011", usd(1000)).unwrap_err(),
        BidInputError::TooManyDecimals
    );
}

#[test]
fn first_failing_rule_wins() {
    // Negative AND over-precise: the positivity rule comes first
    assert_eq!(
        validate_bid_input("-0.005", usd(1000)).unwrap_err(),
        BidInputError::NotPositive
    );
    // Below minimum AND over-precise: the minimum rule comes first
    assert_eq!(
        validate_bid_input("5.005", usd(1000)).unwrap_err(),
        BidInputError::BelowMinimum(usd(1001))
    );
}

#[test]
fn accepts_a_range_of_valid_amounts() {
    let current = usd(1000);
    for cents in [1001, 1050, 1100, 2000, 99_999] {
        let raw = format!("{}.{:02}", cents / 100, cents % 100);
        assert_eq!(
            validate_bid_input(&raw, current).unwrap(),
            usd(cents),
            "expected {} to be a valid bid",
            raw
        );
    }
}

#[test]
fn accepts_whole_and_one_decimal_forms() {
    assert_eq!(validate_bid_input("11", usd(1000)).unwrap(), usd(1100));
    assert_eq!(validate_bid_input("10.5", usd(1000)).unwrap(), usd(1050));
    assert_eq!(validate_bid_input(" 10.25 ", usd(1000)).unwrap(), usd(1025));
}

#[test]
fn error_messages_match_the_form_texts() {
    assert_eq!(
        BidInputError::Missing.to_string(),
        "Please enter a bid amount"
    );
    assert_eq!(
        BidInputError::NotANumber.to_string(),
        "Bid amount must be a valid number"
    );
    assert_eq!(
        BidInputError::NotPositive.to_string(),
        "Bid amount must be greater than $0"
    );
    assert_eq!(
        BidInputError::UnreasonablyHigh.to_string(),
        "Bid amount seems unreasonably high. Please verify."
    );
    assert_eq!(
        BidInputError::TooManyDecimals.to_string(),
        "Bid amount can only have up to 2 decimal places"
    );
}
