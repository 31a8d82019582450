use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pony_core::{logging, AppConfig, PonyService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Command::new("ponies")
        .version(pony_core::VERSION)
        .about("Search and delete ponies")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("latency-ms")
                .long("latency-ms")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Latency of every backend call"),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the ponies screen over HTTP")
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search the seeded backend once")
                .arg(
                    Arg::new("query")
                        .default_value("")
                        .help("Name filter, empty matches every pony"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        );

    let matches = cli.get_matches();
    let config = load_config(&matches)?;
    logging::init(&config.logging)?;

    match matches.subcommand() {
        Some(("serve", args)) => {
            let config = match args.get_one::<SocketAddr>("bind") {
                Some(bind) => config.with_bind(*bind),
                None => config,
            };
            pony_web::serve(&config).await
        }
        Some(("search", args)) => {
            let query = args
                .get_one::<String>("query")
                .map(String::as_str)
                .unwrap_or_default();
            let service = config.backend.build_service()?;
            let ponies = service.search(query).await?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&ponies)?);
            } else {
                for pony in &ponies {
                    println!("{:<4} {:<8} {}", pony.id.as_str(), pony.color.as_str(), pony.name);
                }
                println!("{} found", ponies.len());
            }
            Ok(())
        }
        _ => unreachable!("a subcommand is required"),
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<AppConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::new(),
    };
    Ok(match matches.get_one::<u64>("latency-ms") {
        Some(ms) => config.with_latency(Duration::from_millis(*ms)),
        None => config,
    })
}
