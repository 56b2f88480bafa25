pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod resend_otp;
pub use self::resend_otp::resend_otp;

pub mod types;

#[cfg(test)]
mod test_support;

pub const WELCOME_BANNER: &str = "Welcome to the Occasio API!";

// axum handler for the root banner
pub async fn root() -> &'static str {
    WELCOME_BANNER
}
