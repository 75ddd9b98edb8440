#[tokio::main]
async fn main() -> anyhow::Result<()> {
    issuance_cli::run().await
}
