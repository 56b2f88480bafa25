//! # Occasio (signup & one-time passwords)
//!
//! `occasio` is the account backend of the Occasio event reminder. It accepts
//! signups, emails a 6-digit one-time password, and keeps user records in
//! PostgreSQL.
//!
//! ## Request pipeline
//!
//! Every mutating request runs the same sequence: generate an OTP, deliver it
//! over SMTP, write the record to the remote store, then rebuild the local
//! cache file from the full remote collection. Delivery happens before
//! persistence, so a failed email never leaves a stored record behind.
//!
//! ## Local cache
//!
//! The cache (`data.json` by default) is a write-only mirror for inspection and
//! backup. Handlers never read it; each sync replaces the whole file through a
//! temp-file rename.

pub mod api;
pub mod cli;
pub mod otp;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
