use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::info;
use tunefm_lastfm_client::{LastfmClient, Session};

use crate::cli::ArtistTagsArgs;

/// Run the desktop handshake, pausing while the user authorizes in a browser
pub fn auth<R: BufRead, W: Write>(
    client: &LastfmClient,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Session> {
    let mut authenticator = client.authenticator();
    authenticator
        .get_token()
        .context("failed to obtain an auth token")?;

    writeln!(out, "Open this URL and allow access:")?;
    writeln!(out, "  {}", authenticator.user_auth_url()?)?;
    write!(out, "Press Enter once done... ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let session = authenticator
        .get_session()
        .context("failed to obtain a session (was the token authorized?)")?;
    info!(user = %session.name, "Authorized");

    writeln!(out)?;
    writeln!(out, "Authorized as {}", session.name)?;
    writeln!(out, "Session key: {}", session.key)?;
    writeln!(out, "Store it as LASTFM_SESSION_KEY; it does not expire.")?;

    Ok(session)
}

/// Print an artist's tags, one per line, or the raw JSON response
pub fn artist_tags<W: Write>(
    client: &LastfmClient,
    args: &ArtistTagsArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let query = args.to_query();

    if args.raw {
        let value = client.artist_get_tags_raw(&query)?;
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    let tags = client.artist_get_tags(&query)?;
    if tags.is_empty() {
        writeln!(out, "No tags.")?;
    }
    for name in tags.names() {
        writeln!(out, "{}", name)?;
    }

    Ok(())
}
