use anyhow::Result;
use colored::Colorize;
use native_tls::TlsConnector;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;

/// Repo details
const REPO_OWNER: &str = "codesweep-dev";
const REPO_NAME: &str = "codesweep";

/// Get local version from Cargo.toml at compile time
fn local_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// GitHub release response
#[derive(Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

/// Fetch latest release tag from GitHub using raw HTTPS + serde_json
fn latest_github_release() -> Result<String> {
    let host = "api.github.com";
    let path = format!("/repos/{REPO_OWNER}/{REPO_NAME}/releases/latest");

    // TCP + TLS connection
    let stream = TcpStream::connect((host, 443))?;
    let connector = TlsConnector::new()?;
    let mut stream = connector.connect(host, stream)?;

    // Send HTTP GET request
    let request = format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         User-Agent: codesweep-version-checker\r\n\
         Accept: application/json\r\n\
         Connection: close\r\n\r\n",
        path, host
    );
    stream.write_all(request.as_bytes())?;

    // Read response
    let mut reader = BufReader::new(stream);
    let mut body = String::new();
    let mut in_body = false;

    for line in reader.by_ref().lines() {
        let line = line?;
        if in_body {
            body.push_str(&line);
        } else if line.is_empty() {
            in_body = true; // blank line separates headers from body
        }
    }

    // Deserialize JSON
    let release: GitHubRelease = serde_json::from_str(&body)?;
    Ok(release.tag_name)
}

/// Normalize versions for comparison
fn normalize_version(version: &str) -> String {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .chars()
        .filter(|c| c.is_ascii())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Run version check
pub fn run() {
    println!();
    println!("{}", "Version Check: ".cyan().bold());

    let local = local_version();
    println!("├─ Local version: {}", local.bright_yellow().bold());

    match latest_github_release() {
        Ok(latest) => {
            println!("├─ Latest GitHub release: {}", latest.bright_green().bold());

            if normalize_version(&local) != normalize_version(&latest) {
                println!(
                    "└─ Update available! (Local: {}, Latest: {})",
                    local.red(),
                    latest.bright_green()
                );
            } else {
                println!(
                    "{}",
                    "└─ You are running the latest version.".green().bold()
                );
            }
        }
        Err(_) => {
            // Friendly message, not an error
            println!(
                "\n{}",
                "Could not fetch release information from GitHub. \
                This may be due to network issues or no published releases."
                    .bright_blue()
                    .bold()
            );
        }
    }
}
