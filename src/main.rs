use anyhow::Result;
use clap::Parser;
use est2genome::engine::{self, EstArgs};

fn main() -> Result<()> {
    let args = EstArgs::parse();
    engine::run(args)
}
