//! Value Objects for the voucher domain

use serde::{Deserialize, Serialize};
use std::fmt;

/// Voucher code value object.
///
/// Codes are normalized (trimmed, uppercased) before the charset check, so
/// search and equality are case-insensitive by construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoucherCode(String);

impl VoucherCode {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 30;

    pub fn new(value: impl Into<String>) -> Result<Self, VoucherCodeError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(VoucherCodeError::Empty); }
        if value.len() < Self::MIN_LEN { return Err(VoucherCodeError::TooShort); }
        if value.len() > Self::MAX_LEN { return Err(VoucherCodeError::TooLong); }
        if !value.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            return Err(VoucherCodeError::InvalidCharacter);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum VoucherCodeError { Empty, TooShort, TooLong, InvalidCharacter }
impl std::error::Error for VoucherCodeError {}
impl fmt::Display for VoucherCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Code is required"),
            Self::TooShort => write!(f, "Code must be at least {} characters", VoucherCode::MIN_LEN),
            Self::TooLong => write!(f, "Code must be at most {} characters", VoucherCode::MAX_LEN),
            Self::InvalidCharacter => write!(f, "Code may only contain uppercase letters and digits"),
        }
    }
}
