#[tokio::main]
async fn main() {
    let code = wim::app::startup::startup().await;
    std::process::exit(code);
}
