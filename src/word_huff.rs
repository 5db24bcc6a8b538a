//! Word-level adaptive Huffman codec.
//!
//! A message is split on the single space; every word, and the space
//! separating two words, is a symbol.  Known words go out as the bit
//! path to their leaf.  Unknown words go out as the path to the NCW
//! escape leaf followed by a byte-aligned 16-bit length and the raw
//! bytes, after which both sides grow their tree by one leaf.  The
//! payload is self-delimiting: a stream whose last symbol is a word
//! path gets the (never otherwise coded) NYT path appended, so the
//! decoder cannot mistake padding bits for another symbol.
//!
//! A codec instance must sit on exactly one stream direction.  Feeding
//! a decoder frames out of order, or frames from a second encoder,
//! desynchronizes its tree and garbles or fails every later decode.

use std::sync::Mutex;
use crate::tools::bits::{BitReader,BitWriter};
use crate::tools::huff_tree::HuffTree;
use crate::Error;

/// Stateful word codec.  All public operations take the instance lock
/// for their duration, so a call to `encode` or `decode` is atomic with
/// respect to any concurrent call on the same instance.
pub struct WordCodec {
    tree: Mutex<HuffTree>
}

impl WordCodec {
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(HuffTree::new())
        }
    }

    /// Compress `text` into a bit stream.  Empty input yields an empty
    /// buffer.  Fails only on a word longer than 65535 bytes.
    pub fn encode(&self,text: &str) -> Result<Vec<u8>,Error> {
        let mut tree = self.tree.lock().expect("codec lock poisoned");
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let mut writer = BitWriter::new();
        for (i,word) in text.split(' ').enumerate() {
            if i != 0 {
                emit_word(&mut tree," ",&mut writer)?;
            }
            emit_word(&mut tree,word,&mut writer)?;
        }
        // a stream ending in a word path would leave its padding bits
        // walkable, mark the end with the NYT path instead
        if !writer.is_aligned() {
            let stop = tree.path_to(tree.nyt());
            writer.add_bits(&stop);
        }
        Ok(writer.finish())
    }

    /// Decode a payload produced by the peer codec that has seen the
    /// same frames in the same order.
    pub fn decode(&self,data: &[u8]) -> Result<String,Error> {
        let mut tree = self.tree.lock().expect("codec lock poisoned");
        let mut reader = BitReader::new(data);
        let mut words: Vec<String> = Vec::new();
        while reader.has_bits() {
            let mut curs = tree.root();
            while !tree.is_leaf(curs) {
                curs = tree.child(curs,reader.read_bit()?).ok_or(Error::Corrupt)?;
            }
            if curs == tree.nyt() {
                // end mark, the rest of the buffer is padding
                break;
            }
            if curs == tree.ncw() {
                reader.align_to_byte();
                let length = reader.read_uint16()? as usize;
                let raw = reader.read_bytes(length)?;
                let word = String::from_utf8(raw).map_err(|_| Error::BadText)?;
                if tree.lookup(&word).is_some() {
                    // the sender would not have escaped a known word
                    return Err(Error::Corrupt);
                }
                log::trace!("new word {:?} ({} bytes)",word,length);
                tree.insert(&word);
                if word != " " {
                    words.push(word);
                }
                continue;
            }
            let word = tree.word(curs).ok_or(Error::Corrupt)?.to_string();
            tree.increment(curs);
            if word != " " {
                words.push(word);
            }
        }
        Ok(words.join(" "))
    }
}

/// Emit one symbol: the leaf path for a known word, or the NCW escape
/// followed by a byte-aligned length and the raw bytes for a new one.
fn emit_word(tree: &mut HuffTree,word: &str,writer: &mut BitWriter) -> Result<(),Error> {
    match tree.lookup(word) {
        Some(leaf) => {
            writer.add_bits(&tree.path_to(leaf));
            tree.increment(leaf);
        },
        None => {
            writer.add_bits(&tree.path_to(tree.ncw()));
            let raw = word.as_bytes();
            if raw.len() > u16::MAX as usize {
                return Err(Error::WordTooLong);
            }
            log::trace!("escaping new word {:?} ({} bytes)",word,raw.len());
            writer.add_uint16(raw.len() as u16);
            writer.add_bytes(raw);
            tree.insert(word);
        }
    }
    Ok(())
}

#[cfg(test)]
impl WordCodec {
    pub fn check_invariants(&self) {
        self.tree.lock().expect("codec lock poisoned").check_invariants();
    }
}

#[cfg(test)]
fn round_trip(text: &str) {
    let enc = WordCodec::new();
    let dec = WordCodec::new();
    let payload = enc.encode(text).expect("encode failed");
    let echoed = dec.decode(&payload).expect("decode failed");
    assert_eq!(echoed,text);
}

#[test]
fn empty_message() {
    let enc = WordCodec::new();
    assert_eq!(enc.encode("").expect("encode failed"),Vec::<u8>::new());
    let dec = WordCodec::new();
    assert_eq!(dec.decode(&[]).expect("decode failed"),"");
}

#[test]
fn escape_payload_layout() {
    let enc = WordCodec::new();
    let payload = enc.encode("alpha").expect("encode failed");
    // path to NCW (the bit 1, padded), then length 5, then the raw word
    let expected = "80 00 05 61 6C 70 68 61";
    assert_eq!(payload,hex::decode(expected.replace(" ","")).unwrap());
}

#[test]
fn simple_round_trips() {
    round_trip("hi");
    round_trip("hi hi");
    round_trip("hello world hello");
    round_trip("a b a b a b");
    round_trip("double  space");
    round_trip(" leading and trailing ");
}

#[test]
fn conversation_shares_one_tree() {
    let enc = WordCodec::new();
    let dec = WordCodec::new();
    let lines = [
        "the cat sat",
        "the cat saw the dog",
        "dog and cat and dog and cat",
        "sat the dog sat"
    ];
    for line in lines {
        let payload = enc.encode(line).expect("encode failed");
        assert_eq!(dec.decode(&payload).expect("decode failed"),line);
    }
}

#[test]
fn frames_cannot_be_reordered() {
    let enc = WordCodec::new();
    let _first = enc.encode("hello world").expect("encode failed");
    let second = enc.encode("world hello world").expect("encode failed");
    // a decoder that missed the first frame walks a stale tree
    let dec = WordCodec::new();
    match dec.decode(&second) {
        Ok(text) => assert_ne!(text,"world hello world"),
        Err(_) => {}
    }
}

#[test]
fn invariants_hold_across_a_session() {
    let enc = WordCodec::new();
    let dec = WordCodec::new();
    let lines = [
        "tea for two",
        "two for tea",
        "me for you and you for me",
        "tea tea tea"
    ];
    for line in lines {
        let payload = enc.encode(line).expect("encode failed");
        enc.check_invariants();
        assert_eq!(dec.decode(&payload).expect("decode failed"),line);
        dec.check_invariants();
    }
}

#[test]
fn repetition_compresses() {
    let enc = WordCodec::new();
    let p8 = enc.encode("ha ha ha ha ha ha ha ha").expect("encode failed");
    let single = WordCodec::new();
    let p1 = single.encode("ha").expect("encode failed");
    assert!(p8.len() < 8 * p1.len(),"{} vs {}",p8.len(),8 * p1.len());
}

#[test]
fn long_random_exchange() {
    use rand::rngs::SmallRng;
    use rand::{Rng,SeedableRng};
    let mut rng = SmallRng::seed_from_u64(0xC0DEC);
    let mut words: Vec<String> = Vec::new();
    for _i in 0..256 {
        let len = rng.gen_range(1..=12);
        let word: String = (0..len).map(|_b| rng.gen_range(b'a'..=b'z') as char).collect();
        words.push(word);
    }
    round_trip(&words.join(" "));
    // same alphabet again, chunked over one long-lived codec pair
    let enc = WordCodec::new();
    let dec = WordCodec::new();
    for chunk in words.chunks(16) {
        let line = chunk.join(" ");
        let payload = enc.encode(&line).expect("encode failed");
        assert_eq!(dec.decode(&payload).expect("decode failed"),line);
    }
}

#[test]
fn malformed_streams_fail() {
    // escape announcing five raw bytes that never arrive
    let dec = WordCodec::new();
    assert!(dec.decode(&hex::decode("800005").unwrap()).is_err());
    // escape cut off inside the length field
    let dec = WordCodec::new();
    assert!(dec.decode(&hex::decode("8000").unwrap()).is_err());
    // raw bytes that are not valid text
    let dec = WordCodec::new();
    assert!(dec.decode(&hex::decode("800002FFFE").unwrap()).is_err());
}
