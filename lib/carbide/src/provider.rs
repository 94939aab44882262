//! The boundary to the external cryptographic provider. The engine never
//! parses DER itself; it queries an opaque handle for the fields the
//! certificate model surfaces and caches the answers.

/// Digest algorithms the certificate layer can request over the DER encoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DigestKind {
    Sha1,
    Md5,
}

/// Which distinguished name of the certificate to query.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NameKind {
    Subject,
    Issuer,
}

/// The distinguished name attributes surfaced by the certificate model.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NameAttr {
    CommonName,
    EmailAddress,
    OrganizationName,
    OrganizationalUnitName,
    LocalityName,
    StateOrProvinceName,
    CountryName,
}

/// A single subjectAltName entry. Only DNS entries survive into the
/// certificate model; the rest are carried so providers need not filter.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AltName {
    Dns(String),
    Ip(Vec<u8>),
    Uri(String),
    Other,
}

/// Opaque handle to a parsed X.509 certificate owned by the provider. The
/// wrapping `Certificate` takes ownership and never copies the handle.
pub trait X509 {
    /// Digest of the DER encoding, `None` if the provider cannot compute it.
    fn digest(&self, kind: DigestKind) -> Option<Vec<u8>>;

    /// Raw ASN.1 validity bounds: UTCTime (`YYMMDDHHMMSSZ`) or
    /// GeneralizedTime (`YYYYMMDDHHMMSSZ`) contents.
    fn not_before(&self) -> Option<String>;
    fn not_after(&self) -> Option<String>;

    /// UTF-8 text of a single name attribute, `None` when absent.
    fn name_attribute(&self, name: NameKind, attr: NameAttr) -> Option<String>;

    /// subjectAltName entries in certificate order.
    fn alt_names(&self) -> Vec<AltName>;

    /// The raw version field, zero-based as encoded.
    fn version(&self) -> i32;
}
