use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    onthisday::tui::run().await
}
