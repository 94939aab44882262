use crate::alert::{Alert, Description, Severity};
use crate::brigade::Brigade;
use crate::cert::CertChain;
use crate::conf::Config;
use crate::error::{EngineError, ErrorKind, Fault};
use crate::events::{Event, Subscriber, Subscriptions};
use crate::handshake;
use crate::record::{self, ContentType, Record, RecordReader};
use crate::token::{drive, Progress};
use flint::logging::{self, Logger};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Which end of the connection this session plays.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Client,
    Server,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum LifeCycle {
    Configuring,
    Running,
    /// Peer sent close_notify.
    Closed,
    /// A fatal error occurred; the queued alert may still be drained.
    Failed,
}

/// Per-connection protocol state. A session is single-threaded and
/// cooperative: every operation is synchronous and non-blocking, and
/// waiting for more bytes is expressed by simply returning to the host.
pub struct Session {
    conf: Arc<Config>,
    role: Role,
    state: LifeCycle,

    // I/O surface brigades
    in_enc: Brigade,
    out_enc: Brigade,
    in_clear: Brigade,
    out_clear: Brigade,

    // Inbound handshake accumulation
    in_handshake: Brigade,

    subs: Subscriptions,
    reader: RecordReader,

    // Version observed on the first completed record
    peer_version: Option<(u8, u8)>,
    // Peer switched to protected records via ChangeCipherSpec
    peer_encrypted: bool,

    sni: Option<String>,
    protocols: Vec<String>,
    selected_protocol: Option<String>,

    peer_chain: CertChain,

    log_msgs: VecDeque<String>,
    log: Logger,
}

impl Session {
    /// Creates a client session bound to `conf`.
    #[inline]
    pub fn client(conf: Arc<Config>) -> Session {
        Self::new(conf, Role::Client)
    }

    /// Creates a server session bound to `conf`.
    #[inline]
    pub fn server(conf: Arc<Config>) -> Session {
        Self::new(conf, Role::Server)
    }

    fn new(conf: Arc<Config>, role: Role) -> Session {
        let log = conf.logger().new(logging::o!("role" => format!("{:?}", role)));

        Session {
            conf,
            role,
            state: LifeCycle::Configuring,
            in_enc: Brigade::new(),
            out_enc: Brigade::new(),
            in_clear: Brigade::new(),
            out_clear: Brigade::new(),
            in_handshake: Brigade::new(),
            subs: Subscriptions::new(),
            reader: RecordReader::new(),
            peer_version: None,
            peer_encrypted: false,
            sni: None,
            protocols: Vec::new(),
            selected_protocol: None,
            peer_chain: CertChain::new(),
            log_msgs: VecDeque::new(),
            log,
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Sets the hostname the client intends to reach. Must be called before
    /// `start`, on a client session.
    pub fn name_indication(&mut self, hostname: &str) -> Result<(), Fault> {
        if self.role != Role::Client {
            return Err(fault!(ErrorKind::BadState, "Name indication on a server session"));
        }
        if self.state != LifeCycle::Configuring {
            return Err(fault!(ErrorKind::BadState, "Name indication after start"));
        }

        self.sni = Some(hostname.to_string());
        Ok(())
    }

    /// Appends a protocol name to the ALPN offer. Must be called before
    /// `start`, on a client session.
    pub fn next_protocol_add(&mut self, name: &str) -> Result<(), Fault> {
        if self.role != Role::Client {
            return Err(fault!(ErrorKind::BadState, "Protocol offer on a server session"));
        }
        if self.state != LifeCycle::Configuring {
            return Err(fault!(ErrorKind::BadState, "Protocol offer after start"));
        }
        if name.is_empty() || name.len() > 255 {
            return Err(fault!(ErrorKind::InvalidInput, "Invalid protocol name length: {}", name.len()));
        }

        self.protocols.push(name.to_string());
        Ok(())
    }

    /// Registers a subscriber for `event`. Delivery follows subscription
    /// order; a subscriber added during a publication first sees the next
    /// one. The baton travels as the closure's captures.
    pub fn subscribe<F>(&mut self, event: Event, callback: F)
    where
        F: FnMut(&mut Session, Event) -> Result<(), Fault> + 'static,
    {
        let subscriber: Subscriber = Rc::new(RefCell::new(callback));
        self.subs.subscribe(event, subscriber);
    }

    /// Transitions the session from configuring to running. Clients emit
    /// their hello into `out_enc`. Calling `start` twice is an error.
    pub fn start(&mut self) -> Result<(), Fault> {
        if self.state != LifeCycle::Configuring {
            return Err(fault!(ErrorKind::BadState, "Session already started"));
        }

        self.state = LifeCycle::Running;

        logging::debug!(self.log, "session started";
                        "sni" => ?self.sni,
                        "protocol_offers" => self.protocols.len());

        if self.role == Role::Client {
            let hello = handshake::client_hello(&self.conf, self.sni.as_deref(), &self.protocols);
            let version = self.wire_version();
            record::write_record(&mut self.out_enc, ContentType::Handshake, version, &hello);
            self.publish(Event::IoOutEnc)?;
        }

        Ok(())
    }

    /// Host delivers ciphertext received from the peer. Parses as many
    /// complete records as the bytes allow; a trailing partial record stays
    /// buffered until the next push.
    pub fn in_enc_bytes(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        self.check_pushable()?;

        self.in_enc.append(bytes);
        self.publish(Event::IoInEnc)?;
        self.pump_records()
    }

    /// Host drains ciphertext to write to the peer. Copies up to
    /// `buf.len()` bytes; the second value is what remains buffered, so the
    /// call is restartable in a tight loop.
    pub fn out_enc_bytes(&mut self, buf: &mut [u8]) -> Result<(usize, usize), Fault> {
        let len = self.out_enc.drain(buf);
        Ok((len, self.out_enc.size()))
    }

    /// Application delivers plaintext to be sent to the peer.
    pub fn in_clear_bytes(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        self.check_pushable()?;

        self.in_clear.append(bytes);
        self.publish(Event::IoInClear)?;

        if self.in_clear.is_empty() {
            return Ok(());
        }

        // Null-cipher path: frame the buffered plaintext directly
        let mut payload = vec![0u8; self.in_clear.size()];
        self.in_clear
            .copy_out(&mut payload)
            .expect("Cleartext brigade size out of sync");

        let version = self.wire_version();
        record::write_record(&mut self.out_enc, ContentType::ApplicationData, version, &payload);
        self.publish(Event::IoOutEnc)
    }

    /// Application drains received plaintext.
    pub fn out_clear_bytes(&mut self, buf: &mut [u8]) -> Result<(usize, usize), Fault> {
        let len = self.out_clear.drain(buf);
        Ok((len, self.out_clear.size()))
    }

    /// Protocol version observed on the first completed record.
    #[inline]
    pub fn peer_version(&self) -> Option<(u8, u8)> {
        self.peer_version
    }

    /// The ALPN name agreed with the peer, once negotiation completes.
    #[inline]
    pub fn selected_protocol(&self) -> Option<&str> {
        self.selected_protocol.as_deref()
    }

    /// Retrieves the oldest pending log message queued for the host.
    #[inline]
    pub fn log_msg_get(&mut self) -> Option<String> {
        self.log_msgs.pop_front()
    }

    /// The peer certificate chain assembled so far, leaf first.
    #[inline]
    pub fn peer_chain(&self) -> &CertChain {
        &self.peer_chain
    }

    /// Mutable access for the trust evaluator surfacing peer certificates.
    #[inline]
    pub fn peer_chain_mut(&mut self) -> &mut CertChain {
        &mut self.peer_chain
    }

    /// Delivers `event` to every subscriber in subscription order,
    /// stopping at the first error, which surfaces to the publisher.
    fn publish(&mut self, event: Event) -> Result<(), Fault> {
        let subscribers = self.subs.snapshot(event);

        for subscriber in subscribers {
            let mut callback = subscriber.borrow_mut();
            (&mut *callback)(self, event)?;
        }

        Ok(())
    }

    fn check_pushable(&self) -> Result<(), Fault> {
        match self.state {
            LifeCycle::Running => Ok(()),
            LifeCycle::Configuring => Err(fault!(ErrorKind::BadState, "Session not started")),
            LifeCycle::Failed => Err(fault!(ErrorKind::BadState, "Session failed")),
            LifeCycle::Closed => Err(fault!(ErrorKind::Cancelled, "Session closed by peer")),
        }
    }

    // Parses records out of `in_enc` until the bytes run dry, routing each
    // completed payload to its upper-layer sink.
    fn pump_records(&mut self) -> Result<(), Fault> {
        loop {
            // An alert may have closed or failed the session mid-push
            if self.state != LifeCycle::Running {
                break;
            }

            if self.peer_encrypted && !self.in_enc.is_empty() {
                let fault = fault!(ErrorKind::Unsupported, "Record protection is not implemented");
                self.fail(Description::InternalError);
                return Err(fault);
            }

            let progress = match drive(&mut self.in_enc, &mut self.reader) {
                Ok(progress) => progress,
                Err(EngineError::Wait) => break,
                Err(EngineError::Fatal(fault)) => {
                    self.fail(Description::DecodeError);
                    return Err(fault);
                }
            };

            match progress {
                Progress::Suspended => break,
                Progress::Done => {
                    let record = self.reader.take();

                    if self.peer_version.is_none() {
                        self.peer_version = Some(record.version);
                    }

                    let event = match self.route_record(record) {
                        Ok(event) => event,
                        Err(fault) => {
                            self.fail(Description::DecodeError);
                            return Err(fault);
                        }
                    };

                    // Subscriber errors surface unchanged and do not fail
                    // the session
                    if let Some(event) = event {
                        self.publish(event)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn route_record(&mut self, mut record: Record) -> Result<Option<Event>, Fault> {
        logging::trace!(self.log, "record parsed";
                        "content_type" => ?record.content_type,
                        "version" => ?record.version,
                        "length" => record.payload.size());

        match record.content_type {
            ContentType::Handshake => {
                self.in_handshake.concat(&mut record.payload);
                Ok(None)
            }
            ContentType::ApplicationData => {
                self.out_clear.concat(&mut record.payload);
                Ok(Some(Event::IoOutClear))
            }
            ContentType::Alert => {
                let mut payload = vec![0u8; record.payload.size()];
                record
                    .payload
                    .copy_out(&mut payload)
                    .expect("Alert payload size out of sync");

                let alert = Alert::parse(&payload)?;
                self.handle_alert(alert);
                Ok(Some(Event::LogMsg))
            }
            ContentType::ChangeCipherSpec => {
                let mut payload = [0u8; 1];
                if record.payload.size() != 1 {
                    return Err(fault!(
                        ErrorKind::InvalidInput,
                        "Invalid change cipher spec length: {}",
                        record.payload.size()
                    ));
                }

                record.payload.copy_out(&mut payload).expect("Payload size out of sync");
                if payload[0] != 1 {
                    return Err(fault!(ErrorKind::InvalidInput, "Invalid change cipher spec: {}", payload[0]));
                }

                // The peer now encrypts; the null-cipher engine cannot
                // follow, which pump_records reports on the next record
                self.peer_encrypted = true;
                Ok(None)
            }
        }
    }

    fn handle_alert(&mut self, alert: Alert) {
        logging::debug!(self.log, "alert received";
                        "severity" => ?alert.severity,
                        "description" => ?alert.description);

        match (alert.severity, alert.description) {
            (_, Description::CloseNotify) => {
                self.state = LifeCycle::Closed;
                self.log_msgs.push_back("connection closed by peer".to_string());
            }
            (Severity::Fatal, description) => {
                self.state = LifeCycle::Failed;
                self.log_msgs.push_back(format!("fatal alert from peer: {:?}", description));
            }
            (Severity::Warning, description) => {
                self.log_msgs.push_back(format!("warning alert from peer: {:?}", description));
            }
        }
    }

    // Queues a fatal alert for the peer and moves the session to its failed
    // terminal state. Drains stay legal so the host can flush the alert.
    fn fail(&mut self, description: Description) {
        logging::debug!(self.log, "session failed"; "alert" => ?description);

        let alert = Alert::new(Severity::Fatal, description);
        let version = self.wire_version();
        record::write_record(&mut self.out_enc, ContentType::Alert, version, &alert.to_bytes());

        self.state = LifeCycle::Failed;

        if let Err(err) = self.publish(Event::IoOutEnc) {
            logging::warn!(self.log, "subscriber error while failing session"; "error" => %err);
        }
    }

    #[inline]
    fn wire_version(&self) -> (u8, u8) {
        self.peer_version.unwrap_or((3, 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const HANDSHAKE_RECORD: [u8; 10] = [0x16, 0x03, 0x01, 0x00, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05];

    fn running_client() -> Session {
        let mut conf = Config::new(None);
        conf.use_reasonable_defaults();

        let mut session = Session::client(Arc::new(conf));
        session.start().unwrap();
        session
    }

    fn running_server() -> Session {
        let mut conf = Config::new(None);
        conf.use_reasonable_defaults();

        let mut session = Session::server(Arc::new(conf));
        session.start().unwrap();
        session
    }

    fn drain_all_enc(session: &mut Session) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 32];

        loop {
            let (len, remaining) = session.out_enc_bytes(&mut buf).unwrap();
            out.extend_from_slice(&buf[..len]);
            if remaining == 0 && len == 0 {
                break;
            }
        }

        out
    }

    #[test]
    fn test_handshake_record_accumulates() {
        let mut session = running_server();

        session.in_enc_bytes(&HANDSHAKE_RECORD).unwrap();

        assert_eq!(session.peer_version(), Some((3, 1)));
        assert_eq!(session.in_handshake.size(), 5);

        let mut payload = [0u8; 5];
        session.in_handshake.peek(&mut payload).unwrap();
        assert_eq!(payload, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_byte_at_a_time_matches_whole_feed() {
        let mut session = running_server();

        for byte in HANDSHAKE_RECORD.iter() {
            session.in_enc_bytes(&[*byte]).unwrap();
        }

        assert_eq!(session.peer_version(), Some((3, 1)));
        assert_eq!(session.in_handshake.size(), 5);
    }

    #[test]
    fn test_split_invariance() {
        // Three records back to back: handshake, app data, handshake
        let mut wire = Vec::new();
        wire.extend_from_slice(&HANDSHAKE_RECORD);
        wire.extend_from_slice(&[0x17, 0x03, 0x01, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
        wire.extend_from_slice(&[0x16, 0x03, 0x01, 0x00, 0x01, 0xFF]);

        let feed = |splits: &[usize]| {
            let mut session = running_server();
            let events = Rc::new(Cell::new(0));
            let seen = events.clone();

            session.subscribe(Event::IoOutClear, move |_, _| {
                seen.set(seen.get() + 1);
                Ok(())
            });

            let mut start = 0;
            for &split in splits {
                session.in_enc_bytes(&wire[start..split]).unwrap();
                start = split;
            }
            session.in_enc_bytes(&wire[start..]).unwrap();

            let mut clear = vec![0u8; 16];
            let (len, _) = session.out_clear_bytes(&mut clear).unwrap();

            (session.in_handshake.size(), clear[..len].to_vec(), events.get(), session.peer_version())
        };

        let whole = feed(&[]);

        for _ in 0..32 {
            let a = 1 + rand::random::<usize>() % (wire.len() - 1);
            let b = 1 + rand::random::<usize>() % (wire.len() - 1);
            let splits = if a <= b { [a, b] } else { [b, a] };

            assert_eq!(feed(&splits), whole);
        }
    }

    #[test]
    fn test_invalid_content_type_fails_session() {
        let mut session = running_server();

        let fault = session.in_enc_bytes(&[0xFF, 0x03, 0x01, 0x00, 0x00]).unwrap_err();
        assert_eq!(fault.kind, ErrorKind::InvalidInput);
        assert!(fault.msg.contains("Invalid content type: 255"));

        // A fatal decode_error alert is queued for the peer
        let wire = drain_all_enc(&mut session);
        assert_eq!(wire, vec![0x15, 0x03, 0x03, 0x00, 0x02, 2, 50]);

        // Further pushes are rejected, drains stay legal
        let fault = session.in_enc_bytes(&[0x16]).unwrap_err();
        assert_eq!(fault.kind, ErrorKind::BadState);
        assert!(session.out_enc_bytes(&mut [0u8; 8]).is_ok());
    }

    #[test]
    fn test_application_data_routes_to_out_clear() {
        let mut session = running_server();

        session.in_enc_bytes(&[0x17, 0x03, 0x03, 0x00, 0x04, 9, 8, 7, 6]).unwrap();

        let mut buf = [0u8; 2];
        let (len, remaining) = session.out_clear_bytes(&mut buf).unwrap();
        assert_eq!((len, remaining), (2, 2));
        assert_eq!(buf, [9, 8]);

        let (len, remaining) = session.out_clear_bytes(&mut buf).unwrap();
        assert_eq!((len, remaining), (2, 0));
        assert_eq!(buf, [7, 6]);
    }

    #[test]
    fn test_clear_pipeline_frames_records() {
        let mut session = running_server();

        session.in_clear_bytes(&[1, 2, 3]).unwrap();

        let wire = drain_all_enc(&mut session);
        assert_eq!(wire, vec![0x17, 0x03, 0x03, 0x00, 0x03, 1, 2, 3]);
    }

    #[test]
    fn test_client_start_emits_hello() {
        let mut session = running_client();

        let wire = drain_all_enc(&mut session);

        // A handshake record wrapping a client hello
        assert_eq!(wire[0], 0x16);
        let length = ((wire[3] as usize) << 8) | wire[4] as usize;
        assert_eq!(length, wire.len() - record::HEADER_SIZE);
        assert_eq!(wire[5], 1);
    }

    #[test]
    fn test_client_hello_carries_sni_and_alpn() {
        let mut conf = Config::new(None);
        conf.use_reasonable_defaults();

        let mut session = Session::client(Arc::new(conf));
        session.name_indication("example.test").unwrap();
        session.next_protocol_add("h2").unwrap();
        session.start().unwrap();

        let wire = drain_all_enc(&mut session);
        assert!(wire.windows(12).any(|w| w == b"example.test"));
        assert!(wire.windows(2).any(|w| w == b"h2"));
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let mut session = running_server();

        let fault = session.start().unwrap_err();
        assert_eq!(fault.kind, ErrorKind::BadState);
    }

    #[test]
    fn test_configure_after_start_is_an_error() {
        let mut session = running_client();

        assert_eq!(session.name_indication("late.test").unwrap_err().kind, ErrorKind::BadState);
        assert_eq!(session.next_protocol_add("h2").unwrap_err().kind, ErrorKind::BadState);
    }

    #[test]
    fn test_client_configuration_on_server_is_an_error() {
        let mut conf = Config::new(None);
        conf.use_reasonable_defaults();
        let mut session = Session::server(Arc::new(conf));

        assert_eq!(session.name_indication("example.test").unwrap_err().kind, ErrorKind::BadState);
        assert_eq!(session.next_protocol_add("h2").unwrap_err().kind, ErrorKind::BadState);
    }

    #[test]
    fn test_push_before_start_is_an_error() {
        let mut conf = Config::new(None);
        conf.use_reasonable_defaults();
        let mut session = Session::server(Arc::new(conf));

        assert_eq!(session.in_enc_bytes(&[0x16]).unwrap_err().kind, ErrorKind::BadState);
    }

    #[test]
    fn test_subscribers_run_in_order_and_short_circuit() {
        let mut session = running_server();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let seen = calls.clone();
        session.subscribe(Event::IoOutEnc, move |_, _| {
            seen.borrow_mut().push("h1");
            Err(fault!(ErrorKind::Unsupported, "h1 bails"))
        });

        let seen = calls.clone();
        session.subscribe(Event::IoOutEnc, move |_, _| {
            seen.borrow_mut().push("h2");
            Ok(())
        });

        let fault = session.in_clear_bytes(&[1]).unwrap_err();

        assert_eq!(fault.kind, ErrorKind::Unsupported);
        assert_eq!(*calls.borrow(), vec!["h1"]);
    }

    #[test]
    fn test_subscribers_all_run_on_success() {
        let mut session = running_server();
        let calls = Rc::new(RefCell::new(Vec::new()));

        for name in &["h1", "h2"] {
            let seen = calls.clone();
            let name = *name;
            session.subscribe(Event::IoOutEnc, move |_, _| {
                seen.borrow_mut().push(name);
                Ok(())
            });
        }

        session.in_clear_bytes(&[1]).unwrap();

        assert_eq!(*calls.borrow(), vec!["h1", "h2"]);
    }

    #[test]
    fn test_subscriber_added_mid_publish_defers() {
        let mut session = running_server();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let seen = calls.clone();
        let late_seen = calls.clone();
        session.subscribe(Event::IoOutEnc, move |session, _| {
            seen.borrow_mut().push("h1");

            let seen = late_seen.clone();
            session.subscribe(Event::IoOutEnc, move |_, _| {
                seen.borrow_mut().push("late");
                Ok(())
            });

            Ok(())
        });

        session.in_clear_bytes(&[1]).unwrap();
        assert_eq!(*calls.borrow(), vec!["h1"]);

        session.in_clear_bytes(&[2]).unwrap();
        assert_eq!(*calls.borrow(), vec!["h1", "h1", "late"]);
    }

    #[test]
    fn test_subscriber_reenters_session() {
        let mut session = running_server();
        let drained = Rc::new(RefCell::new(Vec::new()));

        let sink = drained.clone();
        session.subscribe(Event::IoOutClear, move |session, _| {
            let mut buf = [0u8; 8];
            loop {
                let (len, remaining) = session.out_clear_bytes(&mut buf)?;
                sink.borrow_mut().extend_from_slice(&buf[..len]);
                if remaining == 0 {
                    break;
                }
            }
            Ok(())
        });

        session.in_enc_bytes(&[0x17, 0x03, 0x03, 0x00, 0x03, 1, 2, 3]).unwrap();

        assert_eq!(*drained.borrow(), vec![1, 2, 3]);
        assert_eq!(session.out_clear.size(), 0);
    }

    #[test]
    fn test_close_notify_closes_session() {
        let mut session = running_server();

        session.in_enc_bytes(&[0x15, 0x03, 0x03, 0x00, 0x02, 1, 0]).unwrap();

        assert_eq!(session.log_msg_get().unwrap(), "connection closed by peer");
        assert_eq!(session.log_msg_get(), None);

        let fault = session.in_clear_bytes(&[1]).unwrap_err();
        assert_eq!(fault.kind, ErrorKind::Cancelled);
    }

    #[test]
    fn test_fatal_alert_fails_session() {
        let mut session = running_server();

        session.in_enc_bytes(&[0x15, 0x03, 0x03, 0x00, 0x02, 2, 40]).unwrap();

        assert!(session.log_msg_get().unwrap().contains("HandshakeFailure"));
        assert_eq!(session.in_enc_bytes(&[0x16]).unwrap_err().kind, ErrorKind::BadState);
    }

    #[test]
    fn test_log_msg_event_fires() {
        let mut session = running_server();
        let msgs = Rc::new(RefCell::new(Vec::new()));

        let sink = msgs.clone();
        session.subscribe(Event::LogMsg, move |session, _| {
            while let Some(msg) = session.log_msg_get() {
                sink.borrow_mut().push(msg);
            }
            Ok(())
        });

        session.in_enc_bytes(&[0x15, 0x03, 0x03, 0x00, 0x02, 1, 90]).unwrap();

        assert_eq!(msgs.borrow().len(), 1);
        assert!(msgs.borrow()[0].contains("UserCanceled"));
    }

    #[test]
    fn test_change_cipher_spec_stops_the_null_cipher_path() {
        let mut session = running_server();

        session.in_enc_bytes(&[0x14, 0x03, 0x03, 0x00, 0x01, 0x01]).unwrap();

        let fault = session.in_enc_bytes(&[0x17, 0x03, 0x03, 0x00, 0x01, 0xAA]).unwrap_err();
        assert_eq!(fault.kind, ErrorKind::Unsupported);
    }

    #[test]
    fn test_records_use_first_observed_peer_version() {
        let mut session = running_server();

        session.in_enc_bytes(&HANDSHAKE_RECORD).unwrap();
        // A later record with a different version does not overwrite it
        session.in_enc_bytes(&[0x16, 0x03, 0x03, 0x00, 0x01, 0xAB]).unwrap();

        assert_eq!(session.peer_version(), Some((3, 1)));

        session.in_clear_bytes(&[5]).unwrap();
        let wire = drain_all_enc(&mut session);
        assert_eq!(&wire[..5], &[0x17, 0x03, 0x01, 0x00, 0x01]);
    }
}
