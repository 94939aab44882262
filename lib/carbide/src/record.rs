use crate::brigade::Brigade;
use crate::error::{EngineResult, ErrorKind};
use crate::token::{Token, Tokenize, Want};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

/// Record header: content type, protocol version, payload length.
pub const HEADER_SIZE: usize = 5;

/// Payloads larger than this are split across records on the write side.
/// The read side accepts any length the two byte field can express.
pub const MAX_FRAGMENT: usize = 1 << 14;

/// The four record kinds of the TLS wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContentType {
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
}

impl ContentType {
    #[inline]
    pub fn from_u8(value: u8) -> Option<ContentType> {
        match value {
            20 => Some(ContentType::ChangeCipherSpec),
            21 => Some(ContentType::Alert),
            22 => Some(ContentType::Handshake),
            23 => Some(ContentType::ApplicationData),
            _ => None,
        }
    }
}

impl From<ContentType> for u8 {
    #[inline]
    fn from(ct: ContentType) -> Self {
        match ct {
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
        }
    }
}

// Strictly forward progression, no back-edges. Mac and Padding stay
// zero-length pass-throughs until record protection exists.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum RecordState {
    ContentType,
    Version,
    Length,
    Message,
    Mac,
    Padding,
    Done,
}

/// A fully parsed record handed up to the session for routing.
#[derive(Debug)]
pub struct Record {
    pub content_type: ContentType,
    pub version: (u8, u8),
    pub payload: Brigade,
}

/// Pull-parser for a single TLS record. Lives on the session so a record
/// split across several `in_enc` pushes resumes where it stopped.
#[derive(Debug)]
pub struct RecordReader {
    state: RecordState,
    content_type: Option<ContentType>,
    version: (u8, u8),
    length: u16,
    payload: Option<Brigade>,
}

impl RecordReader {
    #[inline]
    pub fn new() -> RecordReader {
        RecordReader {
            state: RecordState::ContentType,
            content_type: None,
            version: (0, 0),
            length: 0,
            payload: None,
        }
    }

    /// Rearms the reader for the next record.
    #[inline]
    pub fn reset(&mut self) {
        *self = RecordReader::new();
    }

    /// Hands out the parsed record once `drive` reported `Done`.
    #[inline]
    pub fn take(&mut self) -> Record {
        debug_assert_eq!(self.state, RecordState::Done);

        let record = Record {
            content_type: self.content_type.expect("Record taken before completion"),
            version: self.version,
            payload: self.payload.take().expect("Record taken before completion"),
        };

        self.reset();
        record
    }
}

impl Tokenize for RecordReader {
    fn want(&self) -> Want {
        match self.state {
            RecordState::ContentType => Want::Bytes(1),
            RecordState::Version => Want::Bytes(2),
            RecordState::Length => Want::Bytes(2),
            RecordState::Message => Want::Brigade(self.length as usize),
            RecordState::Mac => Want::Skip(0),
            RecordState::Padding => Want::Skip(0),
            RecordState::Done => Want::Done,
        }
    }

    fn feed(&mut self, token: Token<'_>) -> EngineResult<()> {
        match self.state {
            RecordState::ContentType => {
                let byte = expect_bytes(&token)[0];

                match ContentType::from_u8(byte) {
                    Some(ct) => self.content_type = Some(ct),
                    None => {
                        return Err(fault!(ErrorKind::InvalidInput, "Invalid content type: {}", byte).into());
                    }
                }

                self.state = RecordState::Version;
            }
            RecordState::Version => {
                let bytes = expect_bytes(&token);
                self.version = (bytes[0], bytes[1]);
                self.state = RecordState::Length;
            }
            RecordState::Length => {
                self.length = BigEndian::read_u16(expect_bytes(&token));
                self.state = RecordState::Message;
            }
            RecordState::Message => {
                match token {
                    Token::Chunk(bb) => self.payload = Some(bb),
                    _ => panic!("Record payload must arrive as a brigade"),
                }
                self.state = RecordState::Mac;
            }
            RecordState::Mac => self.state = RecordState::Padding,
            RecordState::Padding => self.state = RecordState::Done,
            RecordState::Done => panic!("Fed a completed record reader"),
        }

        Ok(())
    }
}

#[inline]
fn expect_bytes<'a>(token: &'a Token<'_>) -> &'a [u8] {
    match token {
        Token::Bytes(bytes) => bytes,
        _ => panic!("Header fields must arrive as byte slices"),
    }
}

/// Frames `payload` into one or more records on `out`, fragmenting at
/// `MAX_FRAGMENT`. A zero length payload still emits a single record.
pub fn write_record(out: &mut Brigade, content_type: ContentType, version: (u8, u8), payload: &[u8]) {
    let mut rest = payload;

    loop {
        let take = rest.len().min(MAX_FRAGMENT);
        let (chunk, tail) = rest.split_at(take);

        let mut buf = Vec::with_capacity(HEADER_SIZE + chunk.len());
        buf.write_u8(content_type.into()).expect("Error writing content type");
        buf.write_u8(version.0).expect("Error writing version");
        buf.write_u8(version.1).expect("Error writing version");
        buf.write_u16::<BigEndian>(chunk.len() as u16).expect("Error writing length");
        buf.extend_from_slice(chunk);

        out.append_buf(buf);

        rest = tail;
        if rest.is_empty() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{drive, Progress};

    fn parse(data: &[u8]) -> EngineResult<(Progress, RecordReader)> {
        let mut bb = Brigade::new();
        bb.append(data);

        let mut reader = RecordReader::new();
        let progress = drive(&mut bb, &mut reader)?;

        Ok((progress, reader))
    }

    #[test]
    fn test_parse_handshake_record() {
        let (progress, mut reader) =
            parse(&[0x16, 0x03, 0x01, 0x00, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();

        assert_eq!(progress, Progress::Done);

        let mut record = reader.take();
        assert_eq!(record.content_type, ContentType::Handshake);
        assert_eq!(record.version, (3, 1));
        assert_eq!(record.payload.size(), 5);

        let mut payload = [0u8; 5];
        record.payload.copy_out(&mut payload).unwrap();
        assert_eq!(payload, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parse_invalid_content_type() {
        let err = parse(&[0xFF, 0x03, 0x01, 0x00, 0x00]).unwrap_err();
        let fault = err.into_fault().unwrap();

        assert_eq!(fault.kind, ErrorKind::InvalidInput);
        assert_eq!(fault.msg, "Invalid content type: 255");
    }

    #[test]
    fn test_parse_empty_payload() {
        let (progress, mut reader) = parse(&[0x17, 0x03, 0x03, 0x00, 0x00]).unwrap();

        assert_eq!(progress, Progress::Done);

        let record = reader.take();
        assert_eq!(record.content_type, ContentType::ApplicationData);
        assert_eq!(record.payload.size(), 0);
    }

    #[test]
    fn test_parse_resumes_across_pushes() {
        let data = [0x16u8, 0x03, 0x01, 0x00, 0x02, 0xAA, 0xBB];
        let mut bb = Brigade::new();
        let mut reader = RecordReader::new();

        for (i, byte) in data.iter().enumerate() {
            bb.append(&[*byte]);
            let progress = drive(&mut bb, &mut reader).unwrap();

            match i {
                6 => assert_eq!(progress, Progress::Done),
                _ => assert_eq!(progress, Progress::Suspended),
            }
        }

        let record = reader.take();
        assert_eq!(record.content_type, ContentType::Handshake);
        assert_eq!(record.payload.size(), 2);
    }

    #[test]
    fn test_write_record_roundtrip() {
        let mut out = Brigade::new();
        write_record(&mut out, ContentType::ApplicationData, (3, 3), &[9, 8, 7]);

        let mut wire = vec![0u8; out.size()];
        out.peek(&mut wire).unwrap();
        assert_eq!(wire, vec![0x17, 0x03, 0x03, 0x00, 0x03, 9, 8, 7]);

        let mut reader = RecordReader::new();
        assert_eq!(drive(&mut out, &mut reader).unwrap(), Progress::Done);
        assert_eq!(reader.take().content_type, ContentType::ApplicationData);
    }

    #[test]
    fn test_write_record_fragments() {
        let payload = vec![0x5Au8; MAX_FRAGMENT + 1];
        let mut out = Brigade::new();

        write_record(&mut out, ContentType::ApplicationData, (3, 3), &payload);

        assert_eq!(out.size(), payload.len() + 2 * HEADER_SIZE);

        let mut header = [0u8; HEADER_SIZE];
        out.peek(&mut header).unwrap();
        assert_eq!(BigEndian::read_u16(&header[3..]) as usize, MAX_FRAGMENT);
    }
}
