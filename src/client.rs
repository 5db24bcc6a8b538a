//! Interactive chat client.
//!
//! One codec instance encodes everything typed at the prompt, a second
//! one on the receive thread decodes everything the broker forwards.
//! The two trees evolve independently; each is paired with its opposite
//! number on the far side of the stream.

use std::io::BufRead;
use std::net::TcpStream;
use crate::frame::{read_frame,write_frame};
use crate::word_huff::WordCodec;
use crate::STDRESULT;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_USER: &str = "anon";

/// Connect and run the prompt loop until EOF or disconnect.
pub fn connect(host: &str,port: u16,username: &str) -> STDRESULT {
    let mut stream = TcpStream::connect((host,port))?;
    let receiver = stream.try_clone()?;
    std::thread::spawn(move || receive_loop(receiver));
    println!("connected to {}:{} - type a message and press enter, ctrl-d to quit",host,port);
    let encoder = WordCodec::new();
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let message = format!("{}: {}",username,line);
        let payload = encoder.encode(&message)?;
        if let Err(e) = write_frame(&mut stream,&payload) {
            log::error!("disconnected from server: {}",e);
            break;
        }
    }
    Ok(())
}

/// Decode forwarded frames until the server goes away or a frame no
/// longer decodes (after which this decoder is unusable anyway).
fn receive_loop(mut stream: TcpStream) {
    let decoder = WordCodec::new();
    loop {
        let payload = match read_frame(&mut stream) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                println!("server closed the connection");
                break;
            },
            Err(e) => {
                log::warn!("receive failed: {}",e);
                break;
            }
        };
        match decoder.decode(&payload) {
            Ok(message) => println!("[in] {}",message),
            Err(e) => {
                log::error!("decode error: {}",e);
                break;
            }
        }
    }
}
