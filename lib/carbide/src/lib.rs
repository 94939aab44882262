//! `Carbide` is an I/O-free TLS protocol engine. It consumes ciphertext bytes
//! arriving from a peer, produces ciphertext bytes to be sent, and exposes a
//! cleartext bidirectional byte stream to the embedding application. The host
//! owns the sockets; the engine never blocks and never performs I/O itself.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::new_without_default)]

#[macro_use]
pub mod error;

pub mod alert;
pub mod brigade;
pub mod cert;
pub mod conf;
pub mod events;
pub mod provider;
pub mod record;
pub mod session;
pub mod token;

mod handshake;

pub mod prelude {
    pub use crate::brigade::Brigade;
    pub use crate::cert::{CertChain, CertName, Certificate};
    pub use crate::conf::Config;
    pub use crate::error::{EngineError, EngineResult, ErrorKind, Fault};
    pub use crate::events::Event;
    pub use crate::session::{Role, Session};
}
