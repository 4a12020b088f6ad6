//! Temp URL signing
//!
//! A temp URL carries an HMAC over `"{METHOD}\n{expires}\n{path}"` keyed
//! with the account's `Temp-Url-Key`. The path is the decoded object path
//! (`/v1/AUTH_account/container/object`), as the service recomputes it.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Sha256, Sha512};

use rcs_domain::error::{Error, Result};
use rcs_domain::value_objects::{
    TempUrlDigest, TempUrlMethod, TempUrlRequest, validate_container_name, validate_object_name,
};

use crate::constants::{TEMP_URL_EXPIRES_PARAM, TEMP_URL_SIG_PARAM};

fn hmac_hex<M: Mac + hmac::digest::KeyInit>(key: &[u8], body: &str) -> Result<String> {
    let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key)
        .map_err(|e| Error::internal(format!("temp URL key rejected: {e}")))?;
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signs (and checks) temp URLs with one account key
#[derive(Clone)]
pub struct TempUrlSigner {
    key: String,
}

impl std::fmt::Debug for TempUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempUrlSigner").finish_non_exhaustive()
    }
}

impl TempUrlSigner {
    /// Signer for the given account key
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self { key: key.into() }
    }

    /// Hex signature of one request
    pub fn sign(
        &self,
        method: TempUrlMethod,
        expires: i64,
        path: &str,
        digest: TempUrlDigest,
    ) -> Result<String> {
        let body = format!("{method}\n{expires}\n{path}");
        match digest {
            TempUrlDigest::Sha256 => hmac_hex::<Hmac<Sha256>>(self.key.as_bytes(), &body),
            TempUrlDigest::Sha512 => hmac_hex::<Hmac<Sha512>>(self.key.as_bytes(), &body),
        }
    }

    /// Whether `signature` is valid for the request and not expired at `now`
    pub fn verify(
        &self,
        method: TempUrlMethod,
        expires: i64,
        path: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if expires <= now.timestamp() {
            return false;
        }
        let digest = if signature.len() == 128 {
            TempUrlDigest::Sha512
        } else {
            TempUrlDigest::Sha256
        };
        self.sign(method, expires, path, digest)
            .is_ok_and(|expected| expected.eq_ignore_ascii_case(signature))
    }

    /// Signed URL for `request` against the account URL `base`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let signer = TempUrlSigner::new("secret");
    /// let url = signer.signed_url(&base, &TempUrlRequest::get("c", "o.txt", Duration::from_secs(60)), Utc::now())?;
    /// ```
    pub fn signed_url(
        &self,
        base: &Url,
        request: &TempUrlRequest,
        now: DateTime<Utc>,
    ) -> Result<String> {
        validate_container_name(&request.container)?;
        validate_object_name(&request.object)?;
        let lifetime = i64::try_from(request.expires_in.as_secs())
            .map_err(|_| Error::invalid_argument("temp URL lifetime is too long"))?;
        if lifetime == 0 {
            return Err(Error::invalid_argument("temp URL lifetime must be positive"));
        }
        let expires = now.timestamp() + lifetime;
        let path = format!(
            "{}/{}/{}",
            base.path().trim_end_matches('/'),
            request.container,
            request.object
        );
        let signature = self.sign(request.method, expires, &path, request.digest)?;

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("storage URL '{base}' cannot carry a path")))?
            .pop_if_empty()
            .push(&request.container)
            .extend(request.object.split('/'));
        url.query_pairs_mut()
            .append_pair(TEMP_URL_SIG_PARAM, &signature)
            .append_pair(TEMP_URL_EXPIRES_PARAM, &expires.to_string());
        Ok(url.into())
    }
}
