use anyhow::Result;
use epi_timeline::run_with_args;

fn main() -> Result<()> {
    run_with_args().map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
