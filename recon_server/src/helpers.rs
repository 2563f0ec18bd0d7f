use hmac::{Hmac, Mac};
use log::trace;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 over `data`, as the gateway computes it for webhook deliveries.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a hex-encoded signature against the body. The comparison happens inside
/// [`Mac::verify_slice`], which is constant-time.
pub fn validate_signature(secret: &str, data: &[u8], signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        trace!("🔐️ Signature header is not valid hex");
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.verify_slice(&provided).is_ok()
}
