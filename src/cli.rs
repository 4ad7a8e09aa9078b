use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::NadeInput;
use crate::store::{NadeFilters, SortOrder};

#[derive(Parser, Debug)]
#[command(name = "nade-catalog")]
#[command(version, about = "Offline reference catalog of grenade lineups")]
pub struct Cli {
    /// Catalog database path (defaults to $NADE_CATALOG_DB, then the user data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List or add maps
    Maps {
        #[command(subcommand)]
        action: MapsAction,
    },

    /// List nades matching the given filters
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single nade
    Show {
        id: i64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Add a new nade
    Add {
        #[command(flatten)]
        nade: NadeArgs,
    },

    /// Edit an existing nade; omitted fields keep their current value
    Edit {
        id: i64,

        #[command(flatten)]
        nade: NadeArgs,
    },

    /// Delete a nade
    Delete { id: i64 },

    /// Export the whole catalog as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON export into the catalog
    Import {
        /// JSON file produced by `export`
        input: PathBuf,
    },

    /// Open a nade's video (URL first, then local file)
    Open { id: i64 },

    /// Check whether a local file exists
    CheckFile { path: PathBuf },

    /// Browse the catalog in a terminal UI
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Serve line-delimited JSON requests on stdin/stdout
    Serve,
}

#[derive(Subcommand, Debug)]
pub enum MapsAction {
    /// List all maps
    List,

    /// Add a map
    Add { name: String },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only this map
    #[arg(long)]
    pub map: Option<String>,

    /// Only this side (T or CT)
    #[arg(long)]
    pub side: Option<String>,

    /// Only this start position
    #[arg(long = "start")]
    pub start_position: Option<String>,

    /// Only this utility type (smoke, flash, molotov, he)
    #[arg(long = "type")]
    pub nade_type: Option<String>,

    /// Case-insensitive text search over title, tags and description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Result order
    #[arg(long, value_enum, default_value_t = SortArg::New)]
    pub sort: SortArg,
}

/// `--sort` values
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    /// Newest first
    #[default]
    New,
    /// By map, then title
    Map,
    /// By title
    Title,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::New => SortOrder::New,
            SortArg::Map => SortOrder::Map,
            SortArg::Title => SortOrder::Title,
        }
    }
}

impl From<FilterArgs> for NadeFilters {
    fn from(args: FilterArgs) -> Self {
        NadeFilters {
            map: args.map,
            side: args.side,
            start_position: args.start_position,
            nade_type: args.nade_type,
            search: args.search,
            sort: args.sort.into(),
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct NadeArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub map: Option<String>,

    /// T or CT
    #[arg(long)]
    pub side: Option<String>,

    #[arg(long = "start")]
    pub start_position: Option<String>,

    #[arg(long = "target")]
    pub target_position: Option<String>,

    /// smoke, flash, molotov or he
    #[arg(long = "type")]
    pub nade_type: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Path to a local video file
    #[arg(long = "video-path")]
    pub local_video_path: Option<String>,

    /// Link to an online video
    #[arg(long = "video-url")]
    pub video_url: Option<String>,

    #[arg(long = "thumbnail-url")]
    pub thumbnail_url: Option<String>,
}

impl NadeArgs {
    /// Overlay the given fields onto `base`. Empty strings clear optional fields.
    pub fn apply_to(self, mut base: NadeInput) -> NadeInput {
        let set = |field: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *field = value.trim().to_string();
            }
        };
        let set_opt = |field: &mut Option<String>, value: Option<String>| {
            if let Some(value) = value {
                let value = value.trim().to_string();
                *field = if value.is_empty() { None } else { Some(value) };
            }
        };

        set(&mut base.title, self.title);
        set(&mut base.map, self.map);
        set(&mut base.side, self.side);
        set(&mut base.start_position, self.start_position);
        set(&mut base.target_position, self.target_position);
        set(&mut base.nade_type, self.nade_type);
        set(&mut base.description, self.description);
        set(&mut base.tags, self.tags);
        set_opt(&mut base.local_video_path, self.local_video_path);
        set_opt(&mut base.video_url, self.video_url);
        set_opt(&mut base.thumbnail_url, self.thumbnail_url);
        base
    }

    /// Build a new entry, defaulting side to T and type to smoke
    pub fn into_new_input(self) -> NadeInput {
        let base = NadeInput {
            side: "T".into(),
            nade_type: "smoke".into(),
            ..Default::default()
        };
        self.apply_to(base)
    }
}

/// Form checks applied before saving; the store itself accepts anything
pub fn validate_input(input: &NadeInput) -> Result<()> {
    let required = [
        ("title", &input.title),
        ("map", &input.map),
        ("start", &input.start_position),
        ("target", &input.target_position),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        bail!("Missing required fields: {}", missing.join(", "));
    }

    if input.local_video_path.is_none() && input.video_url.is_none() {
        bail!("Either --video-path or --video-url is required");
    }

    Ok(())
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
