// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jsonrpc_courier::{HttpTransport, Pipeline, RpcClient};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

pub fn client_for(url: &str) -> RpcClient {
    RpcClient::new(HttpTransport::builder().endpoint(url).build().unwrap())
}

pub fn client_with(url: &str, retries: u32, read_timeout: Duration, pipeline: Pipeline) -> RpcClient {
    let transport = HttpTransport::builder()
        .endpoint(url)
        .retries(retries)
        .connect_timeout(Duration::from_millis(500))
        .read_timeout(read_timeout)
        .pipeline(pipeline)
        .build()
        .unwrap();
    RpcClient::new(transport)
}

pub fn client_with_timeouts(
    url: &str,
    retries: u32,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> RpcClient {
    let transport = HttpTransport::builder()
        .endpoint(url)
        .retries(retries)
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        .build()
        .unwrap();
    RpcClient::new(transport)
}

/// Listener whose accept queue is full, so new connects hang in the handshake.
pub struct StalledServer {
    pub url: String,
    _listener: TcpListener,
    _queued: Vec<TcpStream>,
}

/// Listens with a backlog of one, never accepts, and fills the queue until
/// a further connect no longer completes.
pub async fn stalled_server() -> StalledServer {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(1).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut queued = Vec::new();
    for _ in 0..64 {
        match tokio::time::timeout(Duration::from_millis(100), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => queued.push(stream),
            _ => break,
        }
    }

    StalledServer {
        url: format!("http://{}/", addr),
        _listener: listener,
        _queued: queued,
    }
}

/// Server that accepts every connection and closes it at once.
/// Returns its URL and the number of accepted connections.
pub async fn closing_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    (format!("http://{}/", addr), accepted)
}

/// Server that accepts connections and never answers.
pub async fn silent_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    (format!("http://{}/", addr), accepted)
}

/// URL of a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

pub fn accepted(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
