//! Command implementations for the CLI.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flowdash_client::{ApiError, DashboardClient};

use crate::view;

/// Sign in with a username; the password is read from stdin
pub async fn login(client: DashboardClient, args: Vec<String>) -> anyhow::Result<()> {
    let username = args.first().context("usage: flowdash login <username>")?;

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    client.login(username, password).await.map_err(friendly)?;
    println!("Signed in as {username}.");
    Ok(())
}

/// Sign out, clearing the stored session
pub async fn logout(client: DashboardClient) -> anyhow::Result<()> {
    client.logout().await.map_err(friendly)?;
    println!("Signed out.");
    Ok(())
}

/// Report whether a session is active
pub async fn status(client: DashboardClient) -> anyhow::Result<()> {
    if client.is_authenticated().await {
        println!("Signed in.");
    } else {
        println!("Not signed in. Run 'flowdash login <username>'.");
    }
    Ok(())
}

/// Upload a CSV file and print its summary
pub async fn upload(client: DashboardClient, args: Vec<String>) -> anyhow::Result<()> {
    let path = args.first().context("usage: flowdash upload <file.csv>")?;
    let path = Path::new(path);

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid file path: {}", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let summary = client.upload_csv(file_name, bytes).await.map_err(friendly)?;
    println!("{}", view::render_summary(&summary));
    Ok(())
}

/// Print the most recent uploads
pub async fn history(client: DashboardClient) -> anyhow::Result<()> {
    let entries = client.fetch_history().await.map_err(friendly)?;

    if entries.is_empty() {
        println!("No uploads yet.");
        return Ok(());
    }
    println!("{}", view::render_history(&entries));
    Ok(())
}

/// Download the PDF report for a dataset
pub async fn report(client: DashboardClient, args: Vec<String>) -> anyhow::Result<()> {
    let id: i64 = args
        .first()
        .context("usage: flowdash report <id> [dir]")?
        .parse()
        .context("dataset id must be a number")?;
    let dir = args.get(1).map_or_else(|| PathBuf::from("."), PathBuf::from);

    let download = client.download_report(id).await.map_err(friendly)?;

    let target = dir.join(&download.file_name);
    std::fs::write(&target, &download.bytes)
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!("Saved {} ({} bytes).", target.display(), download.bytes.len());
    Ok(())
}

/// Translate API failures into actionable messages
fn friendly(err: ApiError) -> anyhow::Error {
    match &err {
        ApiError::Transport(_) => anyhow::anyhow!(
            "{err}\nCannot connect to the server. Is the backend running?"
        ),
        ApiError::Timeout(deadline) => anyhow::anyhow!(
            "{err}\nThe server did not respond within {} seconds. Try again later.",
            deadline.as_secs()
        ),
        _ if err.requires_login() => anyhow::anyhow!(
            "{err}\nYour session has ended. Run 'flowdash login <username>'."
        ),
        _ => anyhow::Error::new(err),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for commands.
    use std::time::Duration;

    use super::*;

    /// Transport and timeout failures carry connection guidance.
    #[test]
    fn test_friendly_transport_guidance() {
        let refused = friendly(ApiError::Transport("connection refused".to_string()));
        assert!(refused.to_string().contains("Cannot connect to the server"));

        let slow = friendly(ApiError::Timeout(Duration::from_secs(30)));
        assert!(slow.to_string().contains("did not respond within 30 seconds"));
    }

    /// Session-ending failures point at the login command.
    #[test]
    fn test_friendly_login_guidance() {
        let expired = friendly(ApiError::Auth("token expired".to_string()));
        assert!(expired.to_string().contains("flowdash login"));
    }

    /// Everything else passes through unchanged.
    #[test]
    fn test_friendly_passthrough() {
        let missing = friendly(ApiError::NotFound("dataset 9".to_string()));
        assert_eq!(missing.to_string(), "Not found: dataset 9");
    }
}
