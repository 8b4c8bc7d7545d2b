#[tokio::main]
async fn main() {
    if let Err(e) = brain_backend::run().await {
        log::error!("[brain.backend] Fatal: {}", e);
        eprintln!("brain-backend: {}", e);
        std::process::exit(1);
    }
}
