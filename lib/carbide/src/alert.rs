use crate::error::{ErrorKind, Fault};

/// Alert severity levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Severity {
    Warning = 1,
    Fatal = 2,
}

/// Alert descriptions per RFC 5246 §7.2.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Description {
    CloseNotify = 0,
    UnexpectedMessage = 10,
    BadRecordMac = 20,
    RecordOverflow = 22,
    DecompressionFailure = 30,
    HandshakeFailure = 40,
    BadCertificate = 42,
    UnsupportedCertificate = 43,
    CertificateRevoked = 44,
    CertificateExpired = 45,
    CertificateUnknown = 46,
    IllegalParameter = 47,
    UnknownCa = 48,
    AccessDenied = 49,
    DecodeError = 50,
    DecryptError = 51,
    ProtocolVersion = 70,
    InsufficientSecurity = 71,
    InternalError = 80,
    UserCanceled = 90,
    NoRenegotiation = 100,
    UnsupportedExtension = 110,
}

impl Severity {
    #[inline]
    fn from_u8(value: u8) -> Option<Severity> {
        match value {
            1 => Some(Severity::Warning),
            2 => Some(Severity::Fatal),
            _ => None,
        }
    }
}

impl Description {
    fn from_u8(value: u8) -> Option<Description> {
        let desc = match value {
            0 => Description::CloseNotify,
            10 => Description::UnexpectedMessage,
            20 => Description::BadRecordMac,
            22 => Description::RecordOverflow,
            30 => Description::DecompressionFailure,
            40 => Description::HandshakeFailure,
            42 => Description::BadCertificate,
            43 => Description::UnsupportedCertificate,
            44 => Description::CertificateRevoked,
            45 => Description::CertificateExpired,
            46 => Description::CertificateUnknown,
            47 => Description::IllegalParameter,
            48 => Description::UnknownCa,
            49 => Description::AccessDenied,
            50 => Description::DecodeError,
            51 => Description::DecryptError,
            70 => Description::ProtocolVersion,
            71 => Description::InsufficientSecurity,
            80 => Description::InternalError,
            90 => Description::UserCanceled,
            100 => Description::NoRenegotiation,
            110 => Description::UnsupportedExtension,
            _ => return None,
        };

        Some(desc)
    }
}

/// The two byte payload of an alert record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Alert {
    pub severity: Severity,
    pub description: Description,
}

impl Alert {
    #[inline]
    pub fn new(severity: Severity, description: Description) -> Alert {
        Alert { severity, description }
    }

    pub fn parse(payload: &[u8]) -> Result<Alert, Fault> {
        if payload.len() != 2 {
            return Err(fault!(ErrorKind::InvalidInput, "Invalid alert length: {}", payload.len()));
        }

        let severity = Severity::from_u8(payload[0])
            .ok_or_else(|| fault!(ErrorKind::InvalidInput, "Invalid alert level: {}", payload[0]))?;
        let description = Description::from_u8(payload[1])
            .ok_or_else(|| fault!(ErrorKind::InvalidInput, "Invalid alert description: {}", payload[1]))?;

        Ok(Alert { severity, description })
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 2] {
        [self.severity as u8, self.description as u8]
    }
}
