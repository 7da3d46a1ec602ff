//! kube-ops — native entry point.

mod app;
mod args;

#[cfg(test)]
mod tests;

use clap::Parser;
use tokio::io::BufReader;

use ops_platform::cluster::KubeCluster;
use ops_platform::command::ProcessRunner;
use ops_platform::llm::OpenAiCompatProvider;

use crate::app::{load_config, App};
use crate::args::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let config = load_config(&args)?;
    log::info!(
        "kube-ops starting (model: {}, namespace: {})",
        config.llm.model,
        config.cluster.namespace
    );

    let cluster = KubeCluster::connect(&config.cluster).await?;
    let commands = ProcessRunner::new();
    let llm = OpenAiCompatProvider::new(config.llm.clone());
    let app = App::new(&config, &llm, &cluster, &commands);

    match &args.query {
        Some(query) => println!("{}", app.answer(query).await),
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            app.run_interactive(stdin, &mut stdout).await?;
        }
    }
    Ok(())
}
