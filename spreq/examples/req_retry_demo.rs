//! REQ resend demo: the first replier goes away mid-request and the socket
//! moves the same request to the second one.
//!
//! Run this example:
//! ```bash
//! RUST_LOG=debug cargo run --example req_retry_demo
//! ```

use spreq::dev_tracing::init_tracing;
use spreq::req::ReqSocket;
use spreq::SocketOptions;
use std::io;
use std::time::Duration;
use tracing::info;

#[compio::main]
async fn main() -> io::Result<()> {
    init_tracing();
    info!("=== spreq REQ resend demo ===");

    let socket = ReqSocket::with_options(
        SocketOptions::new()
            .with_resend_ivl(Duration::from_millis(200))
            .with_recv_timeout(Duration::from_secs(5)),
    )?;

    let flaky = socket.pipe()?;
    socket.send("What time is it?")?;

    let request = flaky.recv().await.map_err(io::Error::from)?;
    info!(body = ?request.body(), "[REP 1] Got request, hanging up without replying");

    let steady = socket.pipe()?;
    flaky.disconnect().map_err(io::Error::from)?;

    let request = steady.recv().await.map_err(io::Error::from)?;
    info!(body = ?request.body(), "[REP 2] Got resent request");
    steady.reply(&request, "Half past ten").map_err(io::Error::from)?;

    let reply = socket.recv().await?;
    info!(reply = ?reply, "[REQ] Reply");

    socket.close()
}
