use std::sync::Arc;

use clap::{Parser, Subcommand};
use simple_logger::SimpleLogger;

use dexlp_indexer::cache::ThrottleCache;
use dexlp_indexer::chain::JsonRpcChain;
use dexlp_indexer::config::Settings;
use dexlp_indexer::db::Database;
use dexlp_indexer::graphql;
use dexlp_indexer::indexer;
use dexlp_indexer::queue::KafkaTaskQueue;
use dexlp_indexer::stream::HttpBlockStream;

#[derive(Parser)]
#[command(name = "dexlp-indexer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the block/event indexer loop.
    Indexer {
        /// Discards the stored cursor, restarting from `STREAM_INDEX_FROM_BLOCK`.
        #[arg(long)]
        restart: bool,
    },
    /// Serves the GraphQL query API.
    Server,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log = SimpleLogger::new();
    if let Err(err) = log.init() {
        eprintln!("logger setup failed: {err}");
    }

    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Command::Indexer { restart } => run_indexer(settings, restart).await,
        Command::Server => run_server(settings).await,
    }
}

async fn run_indexer(settings: Settings, restart: bool) -> anyhow::Result<()> {
    let database = Database::new(&settings).await?;
    let rpc_settings = settings.require_rpc().map_err(|e| anyhow::anyhow!(e))?;
    let stream_settings = settings.require_stream().map_err(|e| anyhow::anyhow!(e))?;
    let cache_settings = settings.require_cache().map_err(|e| anyhow::anyhow!(e))?;

    let rpc = JsonRpcChain::new(rpc_settings.url.clone());
    let mut stream = HttpBlockStream::new(stream_settings.url.clone());
    let queue = KafkaTaskQueue::new(&settings.kafka)?;
    let cache = ThrottleCache::new(cache_settings);

    indexer::run(
        database.postgres.as_ref(),
        &rpc,
        &mut stream,
        &queue,
        &cache,
        &settings,
        restart,
    )
    .await
    .map_err(|e| anyhow::anyhow!(e))
}

async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let database = Database::new(&settings).await?;
    let storage: Arc<dyn dexlp_indexer::db::Storage> = database.postgres.clone();
    let schema = graphql::build_schema(storage);
    graphql::serve(schema, settings.graphql_port).await;
    Ok(())
}
