use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dhcpcore::response::make_inform_ack;
use dhcpcore::{
    Config, DhcpOption, DhcpPacket, DhcpServer, DhcpServlet, Result, ServletHandler,
    build_runtime, convert,
};

#[derive(Parser)]
#[command(name = "dhcpcore")]
#[command(author, version, about = "DHCP wire codec and dispatch server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests until interrupted
    Run,
    /// Print the effective configuration
    ShowConfig,
    /// Decode a hex-encoded datagram and print it
    Decode { hex: String },
}

/// Answers DHCPINFORM with the configured options. Other requests are logged
/// by the dispatcher and left unanswered.
struct InformServlet {
    server_ip: Ipv4Addr,
    options: Vec<DhcpOption>,
}

impl DhcpServlet for InformServlet {
    fn do_inform(&self, request: &DhcpPacket) -> Option<DhcpPacket> {
        Some(make_inform_ack(request, self.server_ip, &self.options))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = Config::load_or_create(&cli.config)?;
            info!("Starting DHCP server with config: {:?}", cli.config);

            let servlet = InformServlet {
                server_ip: config.server_ip,
                options: config.policy_options()?,
            };
            let handler = ServletHandler::new(servlet, config.strict_parsing);

            let runtime = build_runtime(&config.pool)?;
            runtime.block_on(async {
                let server = DhcpServer::bind(&config, handler).await?;

                let signal = server.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("Received shutdown signal, stopping server...");
                        signal.stop();
                    }
                });

                server.run().await
            })
        }
        Commands::ShowConfig => {
            let config = Config::load_or_create(&cli.config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Decode { hex } => {
            let data = convert::hex_to_bytes(&hex)?;
            let packet = DhcpPacket::parse_from(&data, 0, data.len(), None, false)?;
            println!("{}", packet);
            Ok(())
        }
    }
}
