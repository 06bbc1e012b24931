use clap::{Parser, Subcommand};
use radarctl::ipc::{self, Command};

#[derive(Parser, Debug)]
#[command(name = "radarctl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control socket of the running radar
    #[arg(short = 's', long, default_value = ipc::SOCKET_PATH)]
    socket: String,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Mount the radar widget and start sweeping
    Show,
    /// Unmount the radar widget, stopping all timers and loads
    Hide,
    /// Point the radar at a new target image
    Target {
        /// Path of the image, resolved against the radar's asset_dir
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Show => Command::Show,
        Commands::Hide => Command::Hide,
        Commands::Target { path } => Command::target(&path)?,
    };

    log::debug!("Sending '{}' to {}", command, cli.socket);
    ipc::send_to(&cli.socket, &command)?;
    Ok(())
}
