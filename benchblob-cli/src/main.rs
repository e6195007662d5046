use anyhow::Result;

fn main() -> Result<()> {
    benchblob_cli::cli::execute()
}
