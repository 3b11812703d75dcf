//! Availability status and its derivation rules.

use serde::{Deserialize, Serialize};

/// Availability status of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// At least one copy is on the shelf.
    Available,
    /// No copy is currently loanable.
    Borrowed,
}

/// Derives the status after one copy has been lent out.
///
/// `new_stock` is the stock count *after* the decrement.
#[must_use]
pub const fn after_borrow(new_stock: i32) -> Availability {
    if new_stock > 0 {
        Availability::Available
    } else {
        Availability::Borrowed
    }
}

/// Derives the status after one copy has come back.
///
/// `new_stock` is the stock count *after* the increment; `open_borrowings`
/// is the number of borrowings still outstanding once the returned one has
/// been removed from the ledger.
///
/// TODO: revisit the `open_borrowings > 0` clause. A book with zero copies
/// on the shelf but open borrowings reads as Available here, while the
/// borrow path would call the same state Borrowed.
#[must_use]
pub const fn after_return(new_stock: i32, open_borrowings: u64) -> Availability {
    if new_stock > 0 || open_borrowings > 0 {
        Availability::Available
    } else {
        Availability::Borrowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Availability::Borrowed)]
    #[case(1, Availability::Available)]
    #[case(7, Availability::Available)]
    fn test_after_borrow(#[case] new_stock: i32, #[case] expected: Availability) {
        assert_eq!(after_borrow(new_stock), expected);
    }

    #[rstest]
    #[case(1, 0, Availability::Available)]
    #[case(3, 2, Availability::Available)]
    #[case(0, 0, Availability::Borrowed)]
    // Outstanding borrowings keep the status Available even at zero stock.
    #[case(0, 1, Availability::Available)]
    fn test_after_return(
        #[case] new_stock: i32,
        #[case] open_borrowings: u64,
        #[case] expected: Availability,
    ) {
        assert_eq!(after_return(new_stock, open_borrowings), expected);
    }

    proptest! {
        /// A return always lands on positive stock, and positive stock is
        /// always Available on both paths.
        #[test]
        fn prop_positive_stock_is_available(stock in 1i32..10_000, open in 0u64..10_000) {
            prop_assert_eq!(after_borrow(stock), Availability::Available);
            prop_assert_eq!(after_return(stock, open), Availability::Available);
        }

        /// The two paths agree whenever no borrowings remain open.
        #[test]
        fn prop_paths_agree_with_no_open_borrowings(stock in 0i32..10_000) {
            prop_assert_eq!(after_borrow(stock), after_return(stock, 0));
        }

        /// The borrow path depends on stock alone.
        #[test]
        fn prop_borrow_path_ignores_ledger(stock in 0i32..10_000) {
            let expected = if stock > 0 {
                Availability::Available
            } else {
                Availability::Borrowed
            };
            prop_assert_eq!(after_borrow(stock), expected);
        }
    }
}
