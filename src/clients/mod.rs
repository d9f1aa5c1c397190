//! Outbound collaborators.  Each one is a trait plus a `reqwest` implementation
//! so the pipeline can be exercised with in-memory fakes.

pub mod price;
pub mod sentiment;
pub mod sheet;
pub mod telegram;

pub use price::PriceSource;
pub use sentiment::SentimentSource;
pub use sheet::RowLogger;
pub use telegram::Broadcaster;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serve `app` on an ephemeral loopback port and return its base URL.
    pub(crate) async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A base URL nothing is listening on.
    pub(crate) async fn closed_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// Loopback traffic must not go through a proxy from the environment.
    pub(crate) fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }
}
