#[tokio::main]
async fn main() {
    cinema_backend::run().await;
}
