use clap::Parser;
use treekeeper_cli::args::BranchDriverCli;
use treekeeper_cli::dispatch::run_branch_driver;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_branch_driver(BranchDriverCli::parse()).await
}
