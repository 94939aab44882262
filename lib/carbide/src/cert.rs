use crate::provider::{AltName, DigestKind, NameAttr, NameKind, X509};
use flint::time::unix_seconds_from_utc;

/// Distinguished name record. Any subset of the attributes may be present.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct CertName {
    pub common_name: Option<String>,
    pub email_address: Option<String>,
    pub organization_name: Option<String>,
    pub organizational_unit_name: Option<String>,
    pub locality_name: Option<String>,
    pub state_or_province_name: Option<String>,
    pub country_name: Option<String>,
}

// Memoization cell distinguishing "not yet computed" from "computed and
// absent". The compute closure runs at most once.
struct Cached<T> {
    slot: Option<Option<T>>,
}

impl<T> Cached<T> {
    #[inline]
    fn new() -> Cached<T> {
        Cached { slot: None }
    }

    #[inline]
    fn get_or_set<F: FnOnce() -> Option<T>>(&mut self, compute: F) -> Option<&T> {
        if self.slot.is_none() {
            self.slot = Some(compute());
        }

        self.slot.as_ref().expect("Cache slot populated above").as_ref()
    }
}

// Validity bound resolved from the ASN.1 encoding once, serving both the
// timestamp and the printable accessor.
struct Stamp {
    ts: i64,
    text: String,
}

/// Wraps an opaque X.509 handle plus its depth within the peer chain.
/// Every accessor is lazy: the first call queries the provider and caches
/// the answer, repeated calls return the cached value untouched.
pub struct Certificate {
    handle: Box<dyn X509>,
    depth: usize,
    fp_sha1: Cached<String>,
    fp_md5: Cached<String>,
    not_before: Cached<Stamp>,
    not_after: Cached<Stamp>,
    subject: Cached<CertName>,
    issuer: Cached<CertName>,
    alt_names: Cached<Vec<String>>,
}

impl Certificate {
    /// Takes ownership of the provider handle without copying it.
    pub fn new(handle: Box<dyn X509>, depth: usize) -> Certificate {
        Certificate {
            handle,
            depth,
            fp_sha1: Cached::new(),
            fp_md5: Cached::new(),
            not_before: Cached::new(),
            not_after: Cached::new(),
            subject: Cached::new(),
            issuer: Cached::new(),
            alt_names: Cached::new(),
        }
    }

    /// Position within the chain, 0 for the leaf.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Certificate version. The wire encodes v3 as 2, bump it.
    #[inline]
    pub fn version(&self) -> i32 {
        self.handle.version() + 1
    }

    pub fn fingerprint_sha1(&mut self) -> Option<&str> {
        let handle = &self.handle;
        self.fp_sha1
            .get_or_set(|| handle.digest(DigestKind::Sha1).map(|md| fingerprint_hex(&md)))
            .map(String::as_str)
    }

    pub fn fingerprint_md5(&mut self) -> Option<&str> {
        let handle = &self.handle;
        self.fp_md5
            .get_or_set(|| handle.digest(DigestKind::Md5).map(|md| fingerprint_hex(&md)))
            .map(String::as_str)
    }

    pub fn not_before(&mut self) -> Option<i64> {
        let handle = &self.handle;
        self.not_before
            .get_or_set(|| handle.not_before().as_deref().and_then(parse_asn1_time))
            .map(|stamp| stamp.ts)
    }

    pub fn not_after(&mut self) -> Option<i64> {
        let handle = &self.handle;
        self.not_after
            .get_or_set(|| handle.not_after().as_deref().and_then(parse_asn1_time))
            .map(|stamp| stamp.ts)
    }

    pub fn not_before_str(&mut self) -> Option<&str> {
        let handle = &self.handle;
        self.not_before
            .get_or_set(|| handle.not_before().as_deref().and_then(parse_asn1_time))
            .map(|stamp| stamp.text.as_str())
    }

    pub fn not_after_str(&mut self) -> Option<&str> {
        let handle = &self.handle;
        self.not_after
            .get_or_set(|| handle.not_after().as_deref().and_then(parse_asn1_time))
            .map(|stamp| stamp.text.as_str())
    }

    pub fn subject(&mut self) -> Option<&CertName> {
        let handle = &self.handle;
        self.subject.get_or_set(|| extract_name(handle.as_ref(), NameKind::Subject))
    }

    pub fn issuer(&mut self) -> Option<&CertName> {
        let handle = &self.handle;
        self.issuer.get_or_set(|| extract_name(handle.as_ref(), NameKind::Issuer))
    }

    /// Number of DNS subjectAltName entries. Non-DNS kinds are skipped.
    pub fn alt_names_count(&mut self) -> usize {
        self.dns_names().len()
    }

    /// DNS subjectAltName at `offset`, `None` past the end.
    pub fn alt_names_entry(&mut self, offset: usize) -> Option<&str> {
        self.dns_names().get(offset).map(String::as_str)
    }

    fn dns_names(&mut self) -> &Vec<String> {
        let handle = &self.handle;
        self.alt_names
            .get_or_set(|| {
                let dns = handle
                    .alt_names()
                    .into_iter()
                    .filter_map(|name| match name {
                        AltName::Dns(dns) => Some(dns),
                        _ => None,
                    })
                    .collect();
                Some(dns)
            })
            .expect("DNS name cache is never absent")
    }
}

// The seven attributes mirror what hosts typically render for a peer.
fn extract_name(handle: &dyn X509, kind: NameKind) -> Option<CertName> {
    let name = CertName {
        common_name: handle.name_attribute(kind, NameAttr::CommonName),
        email_address: handle.name_attribute(kind, NameAttr::EmailAddress),
        organization_name: handle.name_attribute(kind, NameAttr::OrganizationName),
        organizational_unit_name: handle.name_attribute(kind, NameAttr::OrganizationalUnitName),
        locality_name: handle.name_attribute(kind, NameAttr::LocalityName),
        state_or_province_name: handle.name_attribute(kind, NameAttr::StateOrProvinceName),
        country_name: handle.name_attribute(kind, NameAttr::CountryName),
    };

    Some(name)
}

/// Uppercase hex pairs separated by `:`, no trailing separator, empty
/// string for an empty digest.
fn fingerprint_hex(md: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(md.len() * 3);

    for (i, byte) in md.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0F) as usize] as char);
    }

    out
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Accepts UTCTime (13 chars, two digit year pivoting at 50) and
// GeneralizedTime (15 chars). Anything else is treated as absent.
fn parse_asn1_time(raw: &str) -> Option<Stamp> {
    let (year, rest) = match raw.len() {
        13 => {
            let yy: i64 = raw[0..2].parse().ok()?;
            let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
            (year, &raw[2..])
        }
        15 => (raw[0..4].parse().ok()?, &raw[4..]),
        _ => return None,
    };

    if !rest.ends_with('Z') {
        return None;
    }

    let month: u32 = rest[0..2].parse().ok()?;
    let day: u32 = rest[2..4].parse().ok()?;
    let hour: u32 = rest[4..6].parse().ok()?;
    let minute: u32 = rest[6..8].parse().ok()?;
    let second: u32 = rest[8..10].parse().ok()?;

    if month == 0 || month > 12 || day == 0 || day > 31 || hour > 23 || minute > 59 || second > 60 {
        return None;
    }

    let ts = unix_seconds_from_utc(year, month, day, hour, minute, second);
    let text = format!(
        "{} {:2} {:02}:{:02}:{:02} {} GMT",
        MONTHS[(month - 1) as usize],
        day,
        hour,
        minute,
        second,
        year
    );

    Some(Stamp { ts, text })
}

/// Peer certificate chain ordered leaf (depth 0) to root. Owns its members;
/// removing one hands it back to the caller.
pub struct CertChain {
    certs: Vec<Certificate>,
}

impl CertChain {
    #[inline]
    pub fn new() -> CertChain {
        CertChain { certs: Vec::new() }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.certs.len()
    }

    #[inline]
    pub fn entry(&self, offset: usize) -> Option<&Certificate> {
        self.certs.get(offset)
    }

    #[inline]
    pub fn entry_mut(&mut self, offset: usize) -> Option<&mut Certificate> {
        self.certs.get_mut(offset)
    }

    #[inline]
    pub fn append(&mut self, cert: Certificate) {
        self.certs.push(cert);
    }

    /// Removes and returns the certificate at `offset`, `None` past the end.
    /// The remaining chain stays well-formed.
    #[inline]
    pub fn remove(&mut self, offset: usize) -> Option<Certificate> {
        if offset < self.certs.len() {
            Some(self.certs.remove(offset))
        } else {
            None
        }
    }

    /// Destroys every member.
    #[inline]
    pub fn clear(&mut self) {
        self.certs.clear();
    }
}
