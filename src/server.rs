//! TCP chat broker.
//!
//! Accepts any number of clients, decodes every incoming frame with a
//! per-connection codec for the console log, and forwards the original
//! compressed payload verbatim to every other client.  Forwarding the
//! sender's bytes untouched means each receiver's decoder sees exactly
//! the frame sequence the sender's encoder produced, which TCP keeps in
//! order per connection.

use std::net::{SocketAddr,TcpListener,TcpStream};
use std::sync::{Arc,Mutex};
use crate::frame::{read_frame,write_frame};
use crate::word_huff::WordCodec;
use crate::STDRESULT;

/// Registry of live connections.  The streams held here are only ever
/// used for broadcast writes, each reader thread owns its own handle.
struct Registry {
    clients: Mutex<Vec<(u64,TcpStream)>>
}

impl Registry {
    fn add(&self,id: u64,stream: TcpStream) {
        self.clients.lock().expect("registry lock poisoned").push((id,stream));
    }
    fn remove(&self,id: u64) {
        self.clients.lock().expect("registry lock poisoned").retain(|(other,_)| *other != id);
    }
    /// send the frame to everyone but the sender, pruning peers whose
    /// socket has gone away
    fn broadcast(&self,payload: &[u8],sender: u64) {
        let mut clients = self.clients.lock().expect("registry lock poisoned");
        clients.retain_mut(|(id,stream)| {
            if *id == sender {
                return true;
            }
            match write_frame(stream,payload) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("dropping client {} on send: {}",id,e);
                    false
                }
            }
        });
    }
}

/// Run the broker until the process is killed.
pub fn serve(port: u16) -> STDRESULT {
    let listener = TcpListener::bind(("0.0.0.0",port))?;
    log::info!("listening on port {}",port);
    let registry = Arc::new(Registry { clients: Mutex::new(Vec::new()) });
    let mut next_id: u64 = 0;
    for stream in listener.incoming() {
        let stream = stream?;
        let addr = stream.peer_addr()?;
        let id = next_id;
        next_id += 1;
        registry.add(id,stream.try_clone()?);
        log::info!("new client {}",addr);
        let registry = Arc::clone(&registry);
        std::thread::spawn(move || {
            serve_client(stream,addr,id,&registry);
            registry.remove(id);
            log::info!("client {} disconnected",addr);
        });
    }
    Ok(())
}

/// Per-connection loop: read frames, decode for the log, rebroadcast.
/// A decode failure means this connection's tree has diverged from the
/// sender's, so the connection is dropped rather than left to garble
/// every later frame.
fn serve_client(mut stream: TcpStream,addr: SocketAddr,id: u64,registry: &Registry) {
    let codec = WordCodec::new();
    loop {
        let payload = match read_frame(&mut stream) {
            Ok(Some(payload)) => payload,
            Ok(None) => break,
            Err(e) => {
                log::warn!("bad frame from {}: {}",addr,e);
                break;
            }
        };
        match codec.decode(&payload) {
            Ok(message) => {
                println!("[{}] {}",addr,message);
                registry.broadcast(&payload,id);
            },
            Err(e) => {
                log::error!("decode error from {}: {}",addr,e);
                break;
            }
        }
    }
}
