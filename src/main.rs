use anyhow::{anyhow, bail};
use grid_crud_store::config::AppConfig;
use grid_crud_store::{DataStore, LoadOptions, RestStore};
use log::info;
use serde::Serialize;
use serde_json::Value;

const USAGE: &str = "usage: grid-crud-store <command> [args]

commands:
  query  [load-options]     print the compiled query string
  load   [load-options]     fetch one page of records
  count  [load-options]     fetch the total number of matching records
  get    <key>              fetch records by key
  insert <values>           create a record
  update <key> <values>     apply a partial update
  remove <key>              delete a record

load-options and values are JSON; keys are JSON or plain text.
The store is configured via grid-store.{toml,yaml,json} or GRID_STORE__URL.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    grid_crud_store::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(command) => command.as_str(),
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let config = AppConfig::load()?;

    let mut client = reqwest::Client::builder();
    if let Some(timeout) = config.client.timeout() {
        client = client.timeout(timeout);
    }
    let store = RestStore::with_client(config.store, client.build()?)?;
    info!(
        "Using store {} (key field '{}', strict: {})",
        store.config().url,
        store.config().key,
        store.config().strict
    );

    match command {
        "query" => {
            let options = load_options(args.get(1))?;
            println!("{}", store.assembler().compile(&options)?);
        }
        "load" => {
            let options = load_options(args.get(1))?;
            print_json(&store.load(&options).await?)?;
        }
        "count" => {
            let options = load_options(args.get(1))?;
            println!("{}", store.total_count(&options).await?);
        }
        "get" => {
            let key = parse_key(required(&args, 1, "key")?);
            print_json(&store.by_key(&key).await?)?;
        }
        "insert" => {
            let values: Value = serde_json::from_str(required(&args, 1, "values")?)?;
            print_json(&store.insert(&values).await?)?;
        }
        "update" => {
            let key = parse_key(required(&args, 1, "key")?);
            let values: Value = serde_json::from_str(required(&args, 2, "values")?)?;
            print_json(&store.update(&key, &values).await?)?;
        }
        "remove" => {
            let key = parse_key(required(&args, 1, "key")?);
            print_json(&store.remove(&key).await?)?;
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <{}> argument\n\n{}", name, USAGE))
}

fn load_options(arg: Option<&String>) -> anyhow::Result<LoadOptions> {
    match arg {
        Some(json) => Ok(serde_json::from_str(json)?),
        None => Ok(LoadOptions::default()),
    }
}

// `42` is a numeric key, `user-1` a string key.
fn parse_key(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
