use jsonrpsee::http_client::HttpClient;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;

use crate::client::{create_http_client, HttpClientConfig};

/// Serves `module` on a random local port and returns a client connected to it.
/// The server stops when the returned handle is dropped.
pub(crate) async fn start_server(module: RpcModule<()>) -> (HttpClient, ServerHandle) {
    let server = Server::builder().build("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.start(module);
    let client =
        create_http_client(&format!("http://{addr}"), HttpClientConfig::default()).unwrap();
    (client, handle)
}
