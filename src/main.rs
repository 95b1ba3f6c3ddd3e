use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use log::{error, LevelFilter, Metadata, Record};
use std::process::ExitCode;
use std::time::Duration;
use webrcon::{client::Client, error::RconError};

/// Send a single command to a Rust game server over webrcon.
#[derive(Parser, Debug)]
#[command(name = "webrcon", version, about, long_about = None)]
struct Args {
    /// Server hostname or ip address
    #[arg(long, short = 'H', value_parser = NonEmptyStringValueParser::new())]
    host: String,

    /// Server rcon port
    #[arg(long, short = 'P', value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Rcon password
    #[arg(long, short = 'p')]
    password: String,

    /// Command to execute (use quotes for commands with spaces)
    #[arg(long, short = 'c', num_args = 1.., required = true, value_parser = NonEmptyStringValueParser::new())]
    command: Vec<String>,

    /// How long to wait for the connection and for the reply
    #[arg(long, short = 't', value_parser = humantime::parse_duration, default_value = "10s")]
    timeout: Duration,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Print the raw json reply instead of the message text
    #[arg(long)]
    raw: bool,
}

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _ = log::set_logger(&LOGGER).map(|()| {
        log::set_max_level(if args.verbose {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        })
    });

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), RconError> {
    let command = args.command.join(" ");

    let response = Client::execute(
        &args.host,
        args.port,
        &args.password,
        &command,
        args.timeout,
    )
    .await?;

    if args.raw {
        println!("{}", response.raw());
    } else {
        println!("{}", response.message());
        if args.verbose {
            println!("identifier: {}", response.identifier());
            println!("type: {}", response.message_type());
        }
    }

    Ok(())
}
