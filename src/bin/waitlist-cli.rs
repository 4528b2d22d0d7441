use clap::{Parser, Subcommand, ValueEnum};
use waitlist_sdk::{AdminSignups, ClientError, WaitlistClient};

#[derive(Parser)]
#[command(name = "waitlist-cli")]
#[command(about = "Management CLI for the launch waitlist", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin password. Falls back to $ADMIN_PASSWORD.
    #[arg(short, long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign an email up
    Subscribe { email: String },
    /// Show the public signup count
    Stats,
    /// List every signup, newest first (admin)
    List {
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Check service and store health
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = WaitlistClient::new(&cli.url);

    let result = match cli.command {
        Commands::Subscribe { email } => client
            .subscribe(&email)
            .await
            .map(|reply| println!("{}", reply.message)),
        Commands::Stats => client
            .stats()
            .await
            .map(|stats| println!("{}", stats.total_signups)),
        Commands::List { format } => {
            let password = cli
                .password
                .or_else(|| std::env::var("ADMIN_PASSWORD").ok())
                .ok_or("admin password required (--password or ADMIN_PASSWORD)")?;
            match client.admin_signups(&password).await {
                Ok(listing) => {
                    print_listing(&listing, format)?;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Health => client
            .health()
            .await
            .map(|json| println!("{:#}", json)),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
    Ok(())
}

fn print_listing(listing: &AdminSignups, format: Format) -> Result<(), serde_json::Error> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(listing)?),
        Format::Csv => {
            println!("email,created_at,ip_address");
            for signup in &listing.signups {
                println!(
                    "{},{},{}",
                    csv_field(&signup.email),
                    csv_field(&signup.created_at),
                    csv_field(signup.ip_address.as_deref().unwrap_or_default())
                );
            }
        }
    }
    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn report(err: &ClientError) {
    match err {
        ClientError::Api { status, message } => {
            eprintln!("Error: service returned status {}", status);
            eprintln!("Response: {}", message);
        }
        ClientError::Http(e) => eprintln!("Error: {}", e),
    }
}
