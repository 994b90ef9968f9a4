use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    procspec::cli::run_cli()
}
