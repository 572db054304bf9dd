use fb_graph_client::{AuthStrategy, FacebookClient, FacebookClientConfig};
use wiremock::MockServer;

#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "EAAD-test-token";
#[allow(dead_code)]
pub const PAGE_ID: &str = "31698190356";

/// Token auth, with both the Graph and the legacy endpoint pointing at `server`.
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> FacebookClientConfig {
    FacebookClientConfig::builder()
        .auth(AuthStrategy::access_token(ACCESS_TOKEN))
        .graph_endpoint_url(server.uri())
        .legacy_endpoint_url(format!("{}/method", server.uri()))
        .build()
}

#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> FacebookClient {
    FacebookClient::with_config(config_for(server)).unwrap()
}
