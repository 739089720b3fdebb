//! A scripted mock leader: accepts one connection per entry in `actions`,
//! reads exactly one length-prefixed request, then performs the scripted
//! action. Used to drive `LeaderRpc::call` through the redirect/retry
//! scenarios without a real cluster.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub enum Action {
    /// Read the request, then reply with this already-framed response body
    /// (status byte + payload).
    Reply(Vec<u8>),
    /// Accept the connection, read the request, then hang up without
    /// replying.
    HangUp,
}

pub async fn spawn_scripted_server(actions: Vec<Action>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for action in actions {
            let (mut sock, _) = listener.accept().await.unwrap();

            let mut len_buf = [0u8; 4];
            sock.read_exact(&mut len_buf).await.unwrap();
            let len = u32::from_be_bytes(len_buf) as usize;
            let mut request = vec![0u8; len];
            sock.read_exact(&mut request).await.unwrap();

            match action {
                Action::Reply(body) => {
                    sock.write_all(&(body.len() as u32).to_be_bytes())
                        .await
                        .unwrap();
                    sock.write_all(&body).await.unwrap();
                }
                Action::HangUp => drop(sock),
            }
        }
    });

    addr
}

/// Builds a response body: one status byte followed by `payload`.
pub fn response(status: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![status];
    body.extend_from_slice(payload);
    body
}
