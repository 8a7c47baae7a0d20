use clap::{Args, Parser, Subcommand};
use tunefm_lastfm_client::ArtistTagsQuery;

#[derive(Parser, Debug)]
#[command(name = "tunefm")]
#[command(about = "Last.fm web-service client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authorize this application and print a session key to store
    Auth,

    /// Show the tags a user applied to an artist
    ArtistTags(ArtistTagsArgs),
}

#[derive(Args, Debug)]
pub struct ArtistTagsArgs {
    #[arg(long, help = "Artist name", required_unless_present = "mbid")]
    pub artist: Option<String>,

    #[arg(long, help = "MusicBrainz artist ID")]
    pub mbid: Option<String>,

    #[arg(
        long,
        help = "Whose tags to show (defaults to the session user when LASTFM_SESSION_KEY is set)"
    )]
    pub user: Option<String>,

    #[arg(long = "no-autocorrect", help = "Do not correct misspelled artist names")]
    pub no_autocorrect: bool,

    #[arg(long, help = "Print the raw JSON response")]
    pub raw: bool,
}

impl ArtistTagsArgs {
    pub fn to_query(&self) -> ArtistTagsQuery {
        let mut query = ArtistTagsQuery::default();
        if let Some(artist) = &self.artist {
            query = ArtistTagsQuery::artist(artist);
        }
        if let Some(mbid) = &self.mbid {
            query = query.with_mbid(mbid);
        }
        if let Some(user) = &self.user {
            query = query.user(user);
        }
        query.autocorrect(!self.no_autocorrect)
    }
}
