//! Length-prefixed message frames for the chat wire.
//!
//! Every message travels as a 4-byte big-endian length followed by the
//! compressed payload.  The payload bytes are exactly what `word_huff`
//! produced, there is no magic number or version inside.  Empty frames
//! and frames over `MAX_PAYLOAD` are refused.

use std::io::{ErrorKind,Read,Write};

pub const DEFAULT_PORT: u16 = 9000;
/// safety limit, connections announcing more are dropped
pub const MAX_PAYLOAD: u32 = 1_000_000;

/// Read one frame.  `Ok(None)` means the peer closed the stream at a
/// frame boundary.
pub fn read_frame<R: Read>(stream: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut prefix: [u8;4] = [0;4];
    if let Err(e) = stream.read_exact(&mut prefix) {
        return match e.kind() {
            ErrorKind::UnexpectedEof => Ok(None),
            _ => Err(e)
        };
    }
    let length = u32::from_be_bytes(prefix);
    if length == 0 || length > MAX_PAYLOAD {
        return Err(std::io::Error::new(ErrorKind::InvalidData,format!("bad frame length {}",length)));
    }
    let mut payload = vec![0;length as usize];
    stream.read_exact(&mut payload)?;
    Ok(Some(payload))
}

/// Write one frame.
pub fn write_frame<W: Write>(stream: &mut W,payload: &[u8]) -> std::io::Result<()> {
    stream.write_all(&u32::to_be_bytes(payload.len() as u32))?;
    stream.write_all(payload)
}

#[test]
fn frame_round_trip() {
    let mut buf: Vec<u8> = Vec::new();
    write_frame(&mut buf,b"abc").expect("write failed");
    write_frame(&mut buf,b"defg").expect("write failed");
    let mut curs = std::io::Cursor::new(buf);
    assert_eq!(read_frame(&mut curs).expect("read failed"),Some(b"abc".to_vec()));
    assert_eq!(read_frame(&mut curs).expect("read failed"),Some(b"defg".to_vec()));
    assert_eq!(read_frame(&mut curs).expect("read failed"),None);
}

#[test]
fn bad_lengths_are_rejected() {
    let mut curs = std::io::Cursor::new(vec![0,0,0,0]);
    assert!(read_frame(&mut curs).is_err());
    let mut curs = std::io::Cursor::new((MAX_PAYLOAD + 1).to_be_bytes().to_vec());
    assert!(read_frame(&mut curs).is_err());
}

#[test]
fn truncated_payload_is_an_error() {
    let mut buf: Vec<u8> = vec![0,0,0,5];
    buf.extend_from_slice(b"ab");
    let mut curs = std::io::Cursor::new(buf);
    assert!(read_frame(&mut curs).is_err());
}
