#[tokio::main]
async fn main() {
    if let Err(message) = agenda::run().await {
        eprintln!("{message}");
        std::process::exit(1);
    }
}
