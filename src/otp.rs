//! One-time password generation.

use rand::Rng;

/// Smallest code handed out; codes never start with a zero.
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Generate a uniformly random 6-digit code.
#[must_use]
pub fn generate() -> String {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX).to_string()
}

/// True when `value` has the shape of a code issued by [`generate`].
#[cfg(test)]
#[must_use]
pub(crate) fn is_well_formed(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit()) && !value.starts_with('0')
}
