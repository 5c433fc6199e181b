use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Viber-Content-Signature";

/// Validates a Viber callback signature
/// Returns true if the signature is valid
pub fn validate_viber_signature(signature: &str, body: &[u8], auth_token: &str) -> bool {
    // Viber sends the HMAC-SHA256 digest of the raw body as lowercase hex
    let expected_signature = match hex::decode(signature.trim()) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(auth_token.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };

    mac.update(body);

    mac.verify_slice(&expected_signature).is_ok()
}

#[cfg(test)]
pub(crate) fn sign_body(body: &[u8], auth_token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(auth_token.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
