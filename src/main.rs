mod cli;

use clap::Parser;
use cli::args::Cli;
use cli::dispatch::handle;

fn main() {
    let cli = Cli::parse();
    handle(cli);
}
