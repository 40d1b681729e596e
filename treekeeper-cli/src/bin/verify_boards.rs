use clap::Parser;
use treekeeper_cli::args::VerifyBoardsCli;
use treekeeper_cli::dispatch::run_verify_boards;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_verify_boards(VerifyBoardsCli::parse()).await
}
