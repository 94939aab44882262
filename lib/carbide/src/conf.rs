use crate::error::{ErrorKind, Fault};
use flint::logging::{self, Logger};
use serde_derive::Deserialize;

// TLS 1.2 preference order offered in the client hello until the host
// overrides it: ECDHE GCM suites first, then the CBC legacy pair.
const DEFAULT_CIPHER_SUITES: [u16; 6] = [0xC02F, 0xC030, 0xC02B, 0xC02C, 0x002F, 0x0035];

// (3,1) TLS 1.0 through (3,3) TLS 1.2
const DEFAULT_PROTOCOLS: [(u8, u8); 3] = [(3, 3), (3, 2), (3, 1)];

/// Long-lived engine configuration. One configuration serves any number of
/// sessions and must outlive all of them; sessions share it read-only.
#[derive(Debug)]
pub struct Config {
    trust_anchors: Vec<Vec<u8>>,
    cipher_suites: Vec<u16>,
    protocols: Vec<(u8, u8)>,
    reasonable_defaults: bool,
    log: Logger,
}

// On-disk description, loaded the same way the logger config is: TOML
// through serdeconv, binary fields as base64.
#[derive(Deserialize)]
struct ConfigDesc {
    #[serde(default)]
    reasonable_defaults: bool,
    #[serde(default)]
    trust_anchors: Vec<String>,
    #[serde(default)]
    cipher_suites: Vec<u16>,
}

impl Config {
    /// Constructs an empty configuration. Touches the one-shot crypto
    /// initialization so sessions created from this configuration can draw
    /// randomness.
    #[inline]
    pub fn new<'a, L: Into<Option<&'a Logger>>>(log: L) -> Config {
        flint::crypto::init();

        let log = match log.into() {
            Some(log) => log.new(logging::o!()),
            None => Logger::root(logging::Discard, logging::o!()),
        };

        Config {
            trust_anchors: Vec::new(),
            cipher_suites: Vec::new(),
            protocols: Vec::new(),
            reasonable_defaults: false,
            log,
        }
    }

    /// Populates cipher preferences and the protocol list with the stock
    /// selection and marks the trust store ready for anchors.
    pub fn use_reasonable_defaults(&mut self) {
        logging::debug!(self.log, "applying reasonable defaults";
                        "cipher_suites" => DEFAULT_CIPHER_SUITES.len(),
                        "protocols" => DEFAULT_PROTOCOLS.len());

        self.cipher_suites = DEFAULT_CIPHER_SUITES.to_vec();
        self.protocols = DEFAULT_PROTOCOLS.to_vec();
        self.reasonable_defaults = true;
    }

    /// Adds a trusted root, DER encoded. Evaluation of peer chains against
    /// the anchors is the trust evaluator's job, the engine only carries
    /// the material.
    #[inline]
    pub fn add_trust_anchor(&mut self, der: Vec<u8>) {
        self.trust_anchors.push(der);
    }

    /// Loads a configuration from its TOML description.
    pub fn from_toml_str<'a, L: Into<Option<&'a Logger>>>(toml: &str, log: L) -> Result<Config, Fault> {
        let desc: ConfigDesc = serdeconv::from_toml_str(toml)
            .map_err(|err| fault!(ErrorKind::InvalidInput, "Malformed configuration: {}", err))?;

        let mut conf = Config::new(log);

        if desc.reasonable_defaults {
            conf.use_reasonable_defaults();
        }

        if !desc.cipher_suites.is_empty() {
            conf.cipher_suites = desc.cipher_suites;
        }

        for anchor in &desc.trust_anchors {
            let der = base64::decode(anchor)
                .map_err(|err| fault!(ErrorKind::InvalidInput, "Malformed trust anchor: {}", err))?;
            conf.add_trust_anchor(der);
        }

        Ok(conf)
    }

    #[inline]
    pub fn cipher_suites(&self) -> &[u16] {
        &self.cipher_suites
    }

    #[inline]
    pub fn protocols(&self) -> &[(u8, u8)] {
        &self.protocols
    }

    #[inline]
    pub fn trust_anchors(&self) -> &[Vec<u8>] {
        &self.trust_anchors
    }

    #[inline]
    pub fn has_reasonable_defaults(&self) -> bool {
        self.reasonable_defaults
    }

    #[inline]
    pub(crate) fn logger(&self) -> &Logger {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasonable_defaults() {
        let mut conf = Config::new(None);

        assert!(!conf.has_reasonable_defaults());
        assert!(conf.cipher_suites().is_empty());

        conf.use_reasonable_defaults();

        assert!(conf.has_reasonable_defaults());
        assert_eq!(conf.cipher_suites(), &DEFAULT_CIPHER_SUITES[..]);
        assert_eq!(conf.protocols()[0], (3, 3));
    }

    #[test]
    fn test_from_toml() {
        let conf = Config::from_toml_str(
            r#"
reasonable_defaults = true
trust_anchors = ["q80="]
cipher_suites = [49199]
"#,
            None,
        )
        .unwrap();

        assert!(conf.has_reasonable_defaults());
        assert_eq!(conf.trust_anchors(), &[vec![0xAB, 0xCD]]);
        assert_eq!(conf.cipher_suites(), &[0xC02F]);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let err = Config::from_toml_str("not valid [ toml", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let err = Config::from_toml_str(r#"trust_anchors = ["@@not-base64@@"]"#, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }
}
