mod functions;
mod logging;

use mapbind_core::{config, driver, JobConfig, PhaseKind};
use mapbind_local_host::LocalHost;

#[tokio::main]
async fn main() {
    logging::init("info");
    functions::register();
    tracing::debug!("word-count functions registered");

    let mut base = JobConfig::new();
    base.set(config::name_key(), "word count");
    base.set(PhaseKind::Map.function_key(), functions::MAP_FN);
    base.set(PhaseKind::Reduce.function_key(), functions::REDUCE_FN);
    base.set(PhaseKind::Combiner.function_key(), functions::REDUCE_FN);

    let engine = LocalHost::new();
    let cancel = engine.cancellation_token();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        println!("\nCtrl+C received, cancelling job...");
        cancel.cancel();
    });

    let status = driver::run_as_tool(&engine, base, std::env::args()).await;
    std::process::exit(status);
}
