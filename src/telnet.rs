//! Telnet in-band control sequences
//!
//! Clients may interleave negotiation requests and session commands
//! with their text. This module picks those out of a payload so the
//! channel can answer them and hand the rest on as user text.

/// Interpret As Command: marks the start of a control sequence
pub const IAC: u8 = 0xff;
/// Start of subnegotiation, parameters run up to `IAC SE`
pub const SB: u8 = 0xfa;
pub const SE: u8 = 0xf0;
pub const DONT: u8 = 0xfe;
pub const DO: u8 = 0xfd;
pub const WONT: u8 = 0xfc;
pub const WILL: u8 = 0xfb;
pub const ERASE_LINE: u8 = 0xf8;
pub const ERASE_CHAR: u8 = 0xf7;
/// Interrupt Process: the client wants the session gone
pub const INTERRUPT: u8 = 0xf4;

/// Bytes in this range following IAC are session commands
const COMMAND_RANGE: std::ops::RangeInclusive<u8> = 0xf0..=0xfa;

/// Result of scanning a payload that starts with IAC
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Control {
    /// Replies owed to the peer, in the order they were requested
    pub replies: Vec<[u8; 3]>,
    /// Last session command seen, if any
    pub command: Option<u8>,
    /// Bytes that were not part of any control sequence
    pub text: Vec<u8>,
}

impl Control {
    /// Check if the peer asked for the session to be interrupted
    pub fn is_interrupt(&self) -> bool {
        self.command == Some(INTERRUPT)
    }
}

/// Build the `IAC WILL <option>` reply
pub fn will(option: u8) -> [u8; 3] {
    [IAC, WILL, option]
}

/// Split a payload into control sequences and residual text
///
/// Every `DO` is answered with a `WILL` for the same option. `WILL`,
/// `WONT` and `DONT` are consumed along with their option byte.
/// `IAC IAC` stands for a literal 0xff in the text.
pub fn parse_control(bytes: &[u8]) -> Control {
    let mut control = Control::default();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != IAC {
            control.text.push(bytes[i]);
            i += 1;
            continue;
        }

        let Some(&verb) = bytes.get(i + 1) else {
            break;
        };

        match verb {
            IAC => {
                control.text.push(IAC);
                i += 2;
            }
            DO => {
                if let Some(&option) = bytes.get(i + 2) {
                    control.replies.push(will(option));
                }
                i += 3;
            }
            WILL | WONT | DONT => {
                i += 3;
            }
            SB => {
                control.command = Some(SB);
                i = subnegotiation_end(bytes, i + 2);
            }
            v if COMMAND_RANGE.contains(&v) => {
                control.command = Some(v);
                i += 2;
            }
            _ => {
                i += 2;
            }
        }
    }

    control
}

/// Index just past the `IAC SE` closing a subnegotiation that starts at
/// `from`, or the end of the payload when it is never closed
fn subnegotiation_end(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.windows(2).position(|w| w == [IAC, SE]))
        .map_or(bytes.len(), |pos| from + pos + 2)
}
