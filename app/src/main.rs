#[tokio::main]
async fn main() -> anyhow::Result<()> {
    xlend_lib::run().await
}
