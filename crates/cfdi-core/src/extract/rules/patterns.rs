//! Common regex patterns for CFDI field validation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // RFC: 3 letters (legal entity) or 4 (individual), YYMMDD, homoclave
    pub static ref RFC_PATTERN: Regex = Regex::new(
        r"^([A-ZÑ&]{3,4})(\d{2})(\d{2})(\d{2})([A-Z\d]{3})$"
    ).unwrap();

    // Plain decimal amount as written in CFDI attributes
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"^-?\d+(?:\.\d+)?$"
    ).unwrap();
}
