//! Legacy HMAC-SHA1 policy signatures.
//!
//! ```text
//! Signature = Base64(HMAC-SHA1(SecretKey, Policy))
//! ```
//!
//! where `Policy` is the base64-encoded policy document. The form carries
//! the access key in `AWSAccessKeyId` and the result in `Signature`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Sign an encoded policy with `secret_key`.
///
/// # Examples
///
/// ```
/// use sluice_auth::sigv2::sign_policy;
///
/// assert_eq!(sign_policy("secret", "some policy"), "SXQQ3hT5t/bt4P2jOKJ2HkEoe1I=");
/// ```
#[must_use]
pub fn sign_policy(secret_key: &str, encoded_policy: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(encoded_policy.as_bytes());
    BASE64.encode(mac.finalize().into_bytes()).trim().to_owned()
}
