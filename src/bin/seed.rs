#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examdesk::run_seed().await {
        eprintln!("examdesk-seed fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
