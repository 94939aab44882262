use crate::brigade::Brigade;
use crate::error::{EngineResult, ErrorKind};

/// Upper bound on a single `Want::Bytes` request. Fixed-size header fields
/// fit comfortably; anything larger travels as a brigade.
pub const MAX_COPY_BYTES: usize = 256;

/// What a tokenizer wants next from the driver.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Want {
    /// Deliver exactly `n` bytes as a contiguous slice. `n` must not exceed
    /// `MAX_COPY_BYTES`.
    Bytes(usize),
    /// Deliver exactly `n` bytes as a brigade.
    Brigade(usize),
    /// Drop `n` bytes without delivering them.
    Skip(usize),
    /// The tokenizer is finished.
    Done,
}

/// A fulfilled request handed back to the tokenizer.
#[derive(Debug)]
pub enum Token<'a> {
    Bytes(&'a [u8]),
    Chunk(Brigade),
    Skipped(usize),
}

/// A restartable pull-parser. The driver interrogates `want`, fulfills the
/// request from the input brigade and hands the data to `feed`. State lives
/// in the implementor, so a suspended parse resumes wherever it left off.
pub trait Tokenize {
    /// The pending request. Must stay stable until the matching `feed`.
    fn want(&self) -> Want;

    /// Delivers the requested data and advances the tokenizer.
    fn feed(&mut self, token: Token<'_>) -> EngineResult<()>;
}

/// Outcome of a `drive` invocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Progress {
    /// The tokenizer reported `Want::Done`.
    Done,
    /// Not enough buffered bytes to fulfill the pending request. Feed the
    /// brigade and re-invoke with the same tokenizer to resume.
    Suspended,
}

/// Runs `tok` against `bb` until it finishes or runs out of bytes. Each
/// buffered byte is delivered to the tokenizer exactly once.
pub fn drive(bb: &mut Brigade, tok: &mut dyn Tokenize) -> EngineResult<Progress> {
    let mut scratch = [0u8; MAX_COPY_BYTES];

    loop {
        match tok.want() {
            Want::Done => return Ok(Progress::Done),
            Want::Bytes(n) => {
                if n > MAX_COPY_BYTES {
                    return Err(fault!(
                        ErrorKind::InvalidInput,
                        "Byte request of {} exceeds the {} limit",
                        n,
                        MAX_COPY_BYTES
                    )
                    .into());
                }

                if bb.size() < n {
                    return Ok(Progress::Suspended);
                }

                bb.copy_out(&mut scratch[..n])?;
                tok.feed(Token::Bytes(&scratch[..n]))?;
            }
            Want::Brigade(n) => {
                if bb.size() < n {
                    return Ok(Progress::Suspended);
                }

                let mut chunk = Brigade::new();
                bb.consume(n, &mut chunk)?;
                tok.feed(Token::Chunk(chunk))?;
            }
            Want::Skip(n) => {
                if bb.size() < n {
                    return Ok(Progress::Suspended);
                }

                bb.discard(n)?;
                tok.feed(Token::Skipped(n))?;
            }
        }
    }
}
