//! HTTP remote-store port.
//!
//! The store operations are fire-and-forget by contract, so the sync port
//! only renders the request body and enqueues it; [`remote_task`] drains the
//! queue and performs the HTTP exchange over embassy-net. A full queue is
//! reported (and logged by the core) as an unreachable store.

use core::fmt::Write as _;

use embassy_net::{Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Duration;
use embedded_io_async::Write;
use heapless::String;
use log::{info, warn};

use till_core::money::Money;
use till_core::remote::{RemoteError, RemoteStore, TransactionRecord};

/// Host serving the JSON document store. Plain HTTP; certificate validation
/// is out of scope for this device.
const STORE_HOST: &str = "till-store.example.net";
const STORE_PORT: u16 = 80;

const RECORDS_PATH: &str = "/transactions.json";
const BALANCE_PATH: &str = "/account/balance.json";

const BODY_MAX: usize = 192;
const REQUEST_MAX: usize = 512;

/// One queued request: method, path, and pre-rendered body.
pub struct PendingRequest {
    method: &'static str,
    path: &'static str,
    body: String<BODY_MAX>,
}

/// Queue between the sync UI loop and the network task.
pub static REMOTE_QUEUE: Channel<CriticalSectionRawMutex, PendingRequest, 4> = Channel::new();

/// The [`RemoteStore`] the core drives. Enqueues; never blocks on the net.
pub struct QueuedStore;

impl QueuedStore {
    fn enqueue(
        &mut self,
        method: &'static str,
        path: &'static str,
        body: String<BODY_MAX>,
    ) -> Result<(), RemoteError> {
        REMOTE_QUEUE
            .try_send(PendingRequest { method, path, body })
            .map_err(|_| RemoteError::Unreachable)
    }
}

impl RemoteStore for QueuedStore {
    fn append_record(&mut self, record: &TransactionRecord) -> Result<(), RemoteError> {
        let mut body = String::new();
        record
            .write_json(&mut body)
            .map_err(|_| RemoteError::Transport)?;
        self.enqueue("POST", RECORDS_PATH, body)
    }

    fn put_balance(&mut self, balance: Money) -> Result<(), RemoteError> {
        let mut body = String::new();
        write!(body, "{}", balance).map_err(|_| RemoteError::Transport)?;
        self.enqueue("PUT", BALANCE_PATH, body)
    }
}

/// Drain the queue, one HTTP exchange at a time.
#[embassy_executor::task]
pub async fn remote_task(stack: Stack<'static>) {
    loop {
        let request = REMOTE_QUEUE.receive().await;
        match perform(stack, &request).await {
            Ok(status) if (200..300).contains(&status) => {
                info!("{} {}: {}", request.method, request.path, status);
            }
            Ok(status) => {
                warn!("{} {}: unexpected status {}", request.method, request.path, status);
            }
            Err(err) => {
                warn!("{} {}: {}", request.method, request.path, err);
            }
        }
    }
}

async fn perform(stack: Stack<'static>, request: &PendingRequest) -> Result<u16, RemoteError> {
    let addresses = stack
        .dns_query(STORE_HOST, DnsQueryType::A)
        .await
        .map_err(|_| RemoteError::Unreachable)?;
    let address = *addresses.first().ok_or(RemoteError::Unreachable)?;

    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 1024];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(10)));

    socket
        .connect((address, STORE_PORT))
        .await
        .map_err(|_| RemoteError::Unreachable)?;

    let mut head = String::<REQUEST_MAX>::new();
    write!(
        head,
        "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        request.method,
        request.path,
        STORE_HOST,
        request.body.len(),
    )
    .map_err(|_| RemoteError::Transport)?;

    socket
        .write_all(head.as_bytes())
        .await
        .map_err(|_| RemoteError::Transport)?;
    socket
        .write_all(request.body.as_bytes())
        .await
        .map_err(|_| RemoteError::Transport)?;
    socket.flush().await.map_err(|_| RemoteError::Transport)?;

    // Only the status line matters; the body is discarded.
    let mut response = [0u8; 128];
    let read = socket
        .read(&mut response)
        .await
        .map_err(|_| RemoteError::Transport)?;
    parse_status(&response[..read]).ok_or(RemoteError::Transport)
}

/// Pull the numeric code out of an `HTTP/1.x <code> ...` status line.
fn parse_status(response: &[u8]) -> Option<u16> {
    let line = response.split(|&b| b == b'\r').next()?;
    let text = core::str::from_utf8(line).ok()?;
    let code = text.split(' ').nth(1)?;
    code.parse().ok()
}
