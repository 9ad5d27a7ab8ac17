//! Hostname representation,
//! the key type for allowlist membership and activation stats.

use serde::{Deserialize, Deserializer, Serialize};

use crate::util::SingleStringVisitor;

/// Hostname that can be encoded as an international domain name.
#[derive(Clone, Debug, Eq, Serialize)]
#[serde(transparent)]
pub struct Hostname {
    #[serde(skip_serializing)]
    encoded: String,
    raw: String,
}

impl Hostname {
    /// Encoded version of the hostname,
    /// safe to use for checking for duplicate entries.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Unencoded version of the hostname, the persisted spelling.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl<'de> Deserialize<'de> for Hostname {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Unexpected};
        let raw_hostname = deserializer.deserialize_string(SingleStringVisitor)?;
        Self::try_from(&*raw_hostname).or(Err(Error::invalid_value(
            Unexpected::Str(&raw_hostname),
            &"an encodable hostname",
        )))
    }
}

impl TryFrom<&str> for Hostname {
    type Error = idna::Errors;

    /// Constructs a hostname from a string,
    /// single-label hosts are accepted as browsers report them bare.
    /// Fails with [idna::Errors] if the string cannot be encoded as an
    /// international domain name.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let compat_value = idna::domain_to_ascii_strict(&format!("{}.example", value))?;
        let encoded = String::from(
            compat_value
                .strip_suffix(".example")
                .expect("suffix preserved from encoded hostname"),
        );
        Ok(Self {
            encoded,
            raw: String::from(value),
        })
    }
}

impl PartialEq for Hostname {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

#[cfg(test)]
pub mod test {
    use wasm_bindgen_test::wasm_bindgen_test;

    use super::*;
    use crate::util::test::TestFrom;

    #[wasm_bindgen_test]
    fn test_hostname_try_from() {
        assert!(Hostname::try_from("a.com").is_ok());
        assert!(Hostname::try_from("測試.net").is_ok());
        assert!(Hostname::try_from("a..com").is_err());
        assert!(Hostname::try_from(".com").is_err());
        assert!(Hostname::try_from("com.").is_err());
    }

    #[wasm_bindgen_test]
    fn test_hostname_eq() {
        assert_eq!(
            Hostname::tfrom("example.net"),
            Hostname::tfrom("example.net")
        );
        assert_eq!(
            Hostname::tfrom("試驗.net"),
            Hostname::tfrom("xn--w22ay72a.net")
        );
    }

    #[wasm_bindgen_test]
    fn test_hostname_raw_spelling_preserved() {
        assert_eq!(Hostname::tfrom("試驗.net").raw(), "試驗.net");
        assert_eq!(Hostname::tfrom("News.Google.Com").encoded(), "news.google.com");
    }
}
