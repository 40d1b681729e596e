use clap::Parser;
use treekeeper_cli::args::RewriteHistoryCli;
use treekeeper_cli::dispatch::run_rewrite_history;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_rewrite_history(RewriteHistoryCli::parse()).await
}
