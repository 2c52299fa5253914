use order_ledger::command::{Command, HELP, parse_command};
use order_ledger::render::{render_event, render_table, render_totals};
use order_ledger::{
    CatalogService, EventLog, LedgerError, OrderConfig, OrderEntry, OrderLedger, StaticCatalog,
};
use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Optional path to a JSON configuration file
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(PathBuf::from);
    let config = OrderConfig::load(config_path.as_deref())?;

    let catalog = build_catalog(&config)?;
    let ledger = match config.max_rows {
        Some(max) => OrderLedger::with_max_rows(max),
        None => OrderLedger::new(),
    };

    let mut entry = OrderEntry::new(ledger, catalog);
    let events = EventLog::new();
    entry.subscribe(events.clone());

    println!("{}", HELP);
    let mut status = String::from("ok");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&status);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Wait) => {
                        entry.settle().await;
                        status = String::from("ok");
                    }
                    Some(command) => {
                        status = match execute(&mut entry, command, &config) {
                            Ok(message) => message,
                            Err(e) => e.to_string(),
                        };
                    }
                    None => status = String::from("invalid command"),
                }

                print_events(&events, &config);
                prompt(&status);
            }
            Some(_) = entry.next_resolution() => {
                println!();
                print_events(&events, &config);
                prompt(&status);
            }
        }
    }

    Ok(())
}

fn execute(
    entry: &mut OrderEntry,
    command: Command,
    config: &OrderConfig,
) -> Result<String, LedgerError> {
    match command {
        Command::Add(position) => {
            let row_id = match position {
                Some(position) => entry.add_item_at(position)?,
                None => entry.add_item()?,
            };
            return Ok(format!("row {}", row_id));
        }
        Command::Remove(row_id) => {
            entry.remove_item(row_id)?;
        }
        Command::Quantity(row_id, value) => {
            entry.set_quantity(row_id, &value)?;
        }
        Command::Price(row_id, value) => {
            entry.set_unit_price(row_id, &value)?;
        }
        Command::Product(row_id, product_id) => {
            entry.select_product(row_id, product_id.as_deref().unwrap_or(""))?;
        }
        Command::Size(row_id, size) => {
            if !entry.select_size(row_id, &size)? {
                return Ok(format!("size {} not offered", size));
            }
        }
        Command::Color(row_id, color) => {
            if !entry.select_color(row_id, &color)? {
                return Ok(format!("color {} not offered", color));
            }
        }
        Command::Show => {
            print!("{}", render_table(&entry.ledger().snapshot(), &config.currency));
        }
        Command::Totals => {
            let ledger = entry.ledger();
            let totals = ledger.totals(&config.totals_policy());
            print!(
                "{}",
                render_totals(&totals, ledger.total_units(), &config.currency)
            );
        }
        Command::Help => println!("{}", HELP),
        Command::Wait | Command::Quit => {}
    }
    Ok(String::from("ok"))
}

fn build_catalog(config: &OrderConfig) -> Result<Arc<dyn CatalogService>, Box<dyn Error>> {
    if let Some(path) = &config.catalog_file {
        let catalog = StaticCatalog::from_json_file(path)?;
        log::info!("loaded {} products from {}", catalog.len(), path.display());
        return Ok(Arc::new(catalog));
    }
    remote_catalog(config)
}

#[cfg(feature = "http")]
fn remote_catalog(config: &OrderConfig) -> Result<Arc<dyn CatalogService>, Box<dyn Error>> {
    let catalog = order_ledger::HttpCatalog::new(
        &config.catalog_url,
        config.fetch_timeout(),
        config.session_cookie.clone(),
    )?;
    log::info!("using catalog service at {}", config.catalog_url);
    Ok(Arc::new(catalog))
}

#[cfg(not(feature = "http"))]
fn remote_catalog(_config: &OrderConfig) -> Result<Arc<dyn CatalogService>, Box<dyn Error>> {
    Err("no catalog_file configured and HTTP support is disabled".into())
}

fn print_events(events: &EventLog, config: &OrderConfig) {
    for event in events.drain() {
        println!("  {}", render_event(&event, &config.currency));
    }
}

fn prompt(status: &str) {
    print!("({}) > ", status);
    let _ = io::stdout().flush();
}
