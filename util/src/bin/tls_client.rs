//! Simple TLS client: connects to a port, pipes stdin to the peer and the
//! peer's cleartext to stdout. Illustrates how a host wires its socket loop
//! to the engine; the engine itself never touches the socket.

use carbide::prelude::*;
use flint::logging;
use mio::net::TcpStream;
use std::cell::RefCell;
use std::env;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4433";

fn main() {
    let log = logging::term_logger();

    let address = env::args().nth(1).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    let addr: SocketAddr = address.parse().expect("Malformed address");

    let stream = Rc::new(RefCell::new(TcpStream::connect(&addr).expect("Connection failed")));

    let poll = mio::Poll::new().unwrap();
    poll.register(
        &*stream.borrow(),
        mio::Token(0),
        mio::Ready::readable() | mio::Ready::writable(),
        mio::PollOpt::edge(),
    )
    .unwrap();

    let mut conf = Config::new(&log);
    conf.use_reasonable_defaults();

    let mut session = Session::client(Arc::new(conf));

    if let Some(host) = env::args().nth(2) {
        session.name_indication(&host).unwrap();
    }
    session.next_protocol_add("http/1.1").unwrap();

    session.subscribe(Event::LogMsg, |session, _| {
        while let Some(msg) = session.log_msg_get() {
            eprintln!("{}", msg);
        }
        Ok(())
    });

    session.subscribe(Event::IoOutClear, |session, _| {
        let mut buf = [0u8; 8096];
        loop {
            let (len, remaining) = session.out_clear_bytes(&mut buf)?;
            io::stdout().write_all(&buf[..len]).expect("Stdout write failed");
            if remaining == 0 {
                break;
            }
        }
        io::stdout().flush().expect("Stdout flush failed");
        Ok(())
    });

    let sink = stream.clone();
    session.subscribe(Event::IoOutEnc, move |session, _| {
        let mut buf = [0u8; 8096];
        loop {
            let (len, remaining) = session.out_enc_bytes(&mut buf)?;
            let mut written = 0;
            while written < len {
                // The stream is non-blocking; spin on WouldBlock
                let result = sink.borrow_mut().write(&buf[written..len]);
                match result {
                    Ok(n) => written += n,
                    Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => continue,
                    Err(err) => panic!("Socket write failed: {:?}", err),
                }
            }
            if remaining == 0 {
                break;
            }
        }
        Ok(())
    });

    let mut events = mio::Events::with_capacity(1024);

    // Wait until the connect completes before emitting the hello
    poll.poll(&mut events, None).expect("Connect poll failed");

    session.start().expect("Session start failed");

    // Everything on stdin travels to the peer as application data
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input).expect("Stdin read failed");
    if !input.is_empty() {
        bail_on_fault(session.in_clear_bytes(&input));
    }

    let mut buf = [0u8; 8096];
    loop {
        poll.poll(&mut events, None).expect("Read poll failed");

        for event in &events {
            if !event.readiness().is_readable() {
                continue;
            }

            loop {
                let result = stream.borrow_mut().read(&mut buf);
                match result {
                    Ok(0) => return,
                    Ok(n) => bail_on_fault(session.in_enc_bytes(&buf[..n])),
                    Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => break,
                    Err(err) => panic!("Socket read failed: {:?}", err),
                }
            }
        }
    }
}

fn bail_on_fault(result: Result<(), Fault>) {
    if let Err(fault) = result {
        eprintln!("{}", fault);
        std::process::exit(1);
    }
}
