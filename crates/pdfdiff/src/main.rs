use crate::prelude::*;
use clap::Parser;

mod compare;
mod error;
mod export;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    name = "pdfdiff",
    author,
    version,
    about,
    long_about = "Compare two PDF documents page by page and report what text changed",
    after_help = "Examples:\n  \
                  $ pdfdiff original.pdf modified.pdf --report html --out ./my-report\n  \
                  $ pdfdiff original.pdf modified.pdf --format json\n  \
                  $ pdfdiff original.pdf modified.pdf --pages \"1-5,10\"\n  \
                  $ pdfdiff original.pdf modified.pdf --fail-on-diff --threshold 5"
)]
pub struct App {
    #[clap(flatten)]
    options: compare::Options,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let fail_on_diff = app.options.fail_on_diff;

    let exceeded = compare::run(app.options).await?;

    if fail_on_diff && exceeded {
        std::process::exit(1);
    }

    Ok(())
}
