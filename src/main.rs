use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = keysbank::args::parse();
    keysbank::cli::main(args).await
}
