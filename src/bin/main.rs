#[tokio::main]
async fn main() -> biblioteca::Result<()> {
    biblioteca::cli::main().await
}
