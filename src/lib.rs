//! # Huffchat Library
//!
//! Chat transport that compresses every message with a word-level adaptive
//! Huffman code.
//! * `word_huff` is the codec: text in, byte string out, with one
//!   self-balancing code tree per instance
//! * `frame` puts codec output on the wire as length-prefixed frames
//! * `server` is the broadcast broker, `client` the interactive end
//!
//! Encoder and decoder trees start empty and mutate identically as words
//! stream by.  A decoder must therefore see a sender's frames in the order
//! they were encoded, and exactly one codec instance must serve each stream
//! direction.
//!
//! ## Buffer Example
//!
//! ```rs
//! use huffchat::word_huff::WordCodec;
//! let enc = WordCodec::new();
//! let dec = WordCodec::new();
//! let payload = enc.encode("hello world hello").expect("encode failed");
//! let text = dec.decode(&payload).expect("decode failed");
//! assert_eq!(text,"hello world hello");
//! ```

mod tools;
pub mod word_huff;
pub mod frame;
pub mod server;
pub mod client;

type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("word too long to encode")]
    WordTooLong,
    #[error("bit stream ended early")]
    Truncated,
    #[error("raw word is not valid text")]
    BadText,
    #[error("code tree is corrupt")]
    Corrupt
}
