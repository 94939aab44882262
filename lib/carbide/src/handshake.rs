use crate::conf::Config;
use byteorder::{BigEndian, WriteBytesExt};

const HANDSHAKE_CLIENT_HELLO: u8 = 1;

const EXT_SERVER_NAME: u16 = 0x0000;
const EXT_ALPN: u16 = 0x0010;

/// Builds the initial ClientHello handshake message: client version (3,3),
/// fresh random, no session to resume, the configured cipher suites, null
/// compression and the SNI/ALPN extensions when set on the session.
pub(crate) fn client_hello(conf: &Config, sni: Option<&str>, protocols: &[String]) -> Vec<u8> {
    let mut random = [0u8; 32];
    flint::crypto::random_bytes(&mut random);

    let mut body = Vec::with_capacity(128);

    // client_version
    body.push(3);
    body.push(3);
    body.extend_from_slice(&random);

    // No session id to resume
    body.push(0);

    let suites = conf.cipher_suites();
    body.write_u16::<BigEndian>((suites.len() * 2) as u16).expect("Error writing suites");
    for suite in suites {
        body.write_u16::<BigEndian>(*suite).expect("Error writing suites");
    }

    // Null compression only
    body.push(1);
    body.push(0);

    let extensions = build_extensions(sni, protocols);
    body.write_u16::<BigEndian>(extensions.len() as u16).expect("Error writing extensions");
    body.extend_from_slice(&extensions);

    // Handshake header: type plus 24 bit body length
    let mut message = Vec::with_capacity(4 + body.len());
    message.push(HANDSHAKE_CLIENT_HELLO);
    message.write_u24::<BigEndian>(body.len() as u32).expect("Error writing length");
    message.extend_from_slice(&body);

    message
}

fn build_extensions(sni: Option<&str>, protocols: &[String]) -> Vec<u8> {
    let mut out = Vec::new();

    if let Some(hostname) = sni {
        let name = hostname.as_bytes();

        out.write_u16::<BigEndian>(EXT_SERVER_NAME).expect("Error writing extension");
        out.write_u16::<BigEndian>((name.len() + 5) as u16).expect("Error writing extension");
        // Server name list with a single DNS hostname entry
        out.write_u16::<BigEndian>((name.len() + 3) as u16).expect("Error writing extension");
        out.push(0);
        out.write_u16::<BigEndian>(name.len() as u16).expect("Error writing extension");
        out.extend_from_slice(name);
    }

    if !protocols.is_empty() {
        let list_len: usize = protocols.iter().map(|p| p.len() + 1).sum();

        out.write_u16::<BigEndian>(EXT_ALPN).expect("Error writing extension");
        out.write_u16::<BigEndian>((list_len + 2) as u16).expect("Error writing extension");
        out.write_u16::<BigEndian>(list_len as u16).expect("Error writing extension");

        for proto in protocols {
            out.push(proto.len() as u8);
            out.extend_from_slice(proto.as_bytes());
        }
    }

    out
}
