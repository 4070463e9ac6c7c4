//! Catalog of known data-quality issue flags.
//!
//! Flags travel as plain strings so that data sources can carry flags the
//! catalog does not know about; those are legal but no tower targets them.

pub const EXPIRED_LEGAL_ID: &str = "expired_legal_id";
pub const DUPLICATE_LEGAL_ID: &str = "duplicate_legal_id";
pub const DUPLICATE_CUSTOMER_ID: &str = "duplicate_customer_id";
pub const DORMANT_HIGH_BALANCE: &str = "dormant_high_balance";
pub const LOCKED_RATIO_GT25: &str = "locked_ratio_gt25";
pub const PAST_MATURITY_NOT_CLOSED: &str = "past_maturity_not_closed";
pub const LOAN_OVERDUE_120D: &str = "loan_overdue_120d";
pub const INTEREST_IN_ARREARS: &str = "interest_in_arrears";

/// (flag, description) for every flag the sample data produces.
pub const CATALOG: &[(&str, &str)] = &[
    (EXPIRED_LEGAL_ID, "Legal ID has expired"),
    (DUPLICATE_LEGAL_ID, "Duplicate legal ID found"),
    (DORMANT_HIGH_BALANCE, "Dormant account with high balance"),
    (LOCKED_RATIO_GT25, "Account locked ratio > 25%"),
    (PAST_MATURITY_NOT_CLOSED, "Account past maturity but not closed"),
    (LOAN_OVERDUE_120D, "Loan overdue by 120+ days"),
    (INTEREST_IN_ARREARS, "Interest payments in arrears"),
];

/// Human-readable description of a flag, if it is in the catalog.
pub fn describe_flag(flag: &str) -> Option<&'static str> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == flag)
        .map(|(_, description)| *description)
}
