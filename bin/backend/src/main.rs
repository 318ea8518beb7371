//! Novelshelf Backend Binary
//!
//! Serves the content API with stateless token auth on BIND_ADDR
//! (e.g. 0.0.0.0:8001).

#[tokio::main]
async fn main() {
    nvs_core::log();
    nvs_server::run().await.unwrap();
}
