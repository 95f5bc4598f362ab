#[tokio::main]
async fn main() -> anyhow::Result<()> {
    herald_rs::cli::run().await
}
