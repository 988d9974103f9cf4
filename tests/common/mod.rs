use axum::Router;
use homecare_client::config::Config;
use homecare_client::HomecareClient;
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral local port and returns a client pointed at it.
pub async fn spawn_backend(app: Router) -> HomecareClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let mut config = Config::new(&format!("http://{}/api", addr))
        .expect("config")
        .with_token("test-token");
    config.request_timeout_secs = 5;
    config.certificate_poll_interval_ms = 10;
    config.certificate_max_polls = 5;
    HomecareClient::new(config).expect("client")
}
