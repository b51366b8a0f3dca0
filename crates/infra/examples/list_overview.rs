//! Example: Printing the lists and groups of a console
//!
//! Loads the client configuration the usual way (environment first, then a
//! `mailup.toml`/`mailup.json`/`config.*` file) and prints every list with
//! its groups.
//!
//! # Setup
//!
//! ```bash
//! export MAILUP_USERNAME=a1234
//! export MAILUP_PASSWORD=secret
//! export MAILUP_CONSOLE_URL=https://a1234.s1.emailsp.com/
//! RUST_LOG=mailup_infra=debug cargo run --example list_overview
//! ```

use mailup_infra::MailUpClient;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut client = MailUpClient::from_default_config()?;

    println!("MailUp lists for {}", client.credentials().username());
    println!("=================================\n");

    for list in client.get_lists_and_groups()? {
        println!("#{} {} ({})", list.id, list.name, list.guid);
        for group in &list.groups {
            println!("    #{} {}", group.id, group.name);
        }
    }

    client.logout()?;
    Ok(())
}
