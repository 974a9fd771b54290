use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hiphop_map::models::{Aggregation, ExposureMetric, Genre, Geography, Selection, Weighting};
use hiphop_map::render::{self, RenderOptions};
use hiphop_map::session::Notice;
use hiphop_map::{ArtifactFetcher, Config, DropboxClient, config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hiphop-map",
    version,
    about = "Fetch and display pre-rendered Hip Hop exposure maps"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the artifact file name for a selection.
    Name(SelectionArgs),
    /// List the map artifacts available in the remote folder.
    List(RemoteArgs),
    /// Download the map for a selection and write a viewable page.
    Load(LoadArgs),
}

#[derive(Args, Debug)]
struct SelectionArgs {
    /// Geographic area to view: station, county, tract (or the full label).
    #[arg(short, long, default_value = "station")]
    geography: Geography,
    /// Type of exposure to display: 1997, initial-year (or the full label).
    #[arg(short, long, default_value = "1997")]
    exposure: ExposureMetric,
    /// Genre counted as Hip Hop: hip-hop, black, urban-contemporary (repeatable, any order).
    #[arg(long = "genre")]
    genres: Vec<Genre>,
    /// Sum or average station concentrations (County/Census Tract, 1997 only).
    #[arg(long, default_value = "average")]
    aggregation: Aggregation,
    /// Weight by station rating: non-weighted, weighted (County/Census Tract, 1997 only).
    #[arg(long, default_value = "non-weighted")]
    weighting: Weighting,
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Remote folder holding the artifacts (overrides configuration).
    #[arg(long)]
    folder: Option<String>,
    /// Environment variable to read the access token from.
    #[arg(long)]
    token_env: Option<String>,
}

#[derive(Args, Debug)]
struct LoadArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    #[command(flatten)]
    remote: RemoteArgs,
    /// Where to write the page (default: a new temporary file).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Height of the map frame in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Leave out the title, introduction and methodology text.
    #[arg(long, default_value_t = false)]
    no_intro: bool,
}

impl SelectionArgs {
    fn to_selection(&self) -> Selection {
        Selection {
            geography: self.geography,
            exposure: self.exposure,
            genres: self.genres.iter().copied().collect(),
            aggregation: self.aggregation,
            weighting: self.weighting,
        }
    }
}

fn load_config(remote: &RemoteArgs) -> Result<Config> {
    let token_var = remote.token_env.as_deref().unwrap_or(config::ENV_TOKEN);
    let lookup = |key: &str| {
        let key = if key == config::ENV_TOKEN { token_var } else { key };
        std::env::var(key).ok()
    };
    let mut cfg =
        Config::load_from(lookup, &config::secrets_path()).context("load configuration")?;
    if let Some(folder) = remote.folder.as_ref() {
        cfg.folder = folder.clone();
    }
    Ok(cfg)
}

fn fetcher(cfg: &Config) -> Result<ArtifactFetcher<DropboxClient>> {
    let client = DropboxClient::new(cfg).context("build Dropbox client")?;
    Ok(ArtifactFetcher::new(client, cfg.folder.clone()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Name(args) => {
            println!("{}", args.to_selection().artifact_name());
            Ok(())
        }
        Command::List(args) => cmd_list(args),
        Command::Load(args) => cmd_load(args),
    }
}

fn cmd_list(args: RemoteArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let mut names = fetcher(&cfg)?.available()?;
    names.sort();
    for name in &names {
        println!("{name}");
    }
    eprintln!("{} map(s) in {}", names.len(), cfg.folder);
    Ok(())
}

fn cmd_load(args: LoadArgs) -> Result<()> {
    let selection = args.selection.to_selection();
    let cfg = load_config(&args.remote)?;
    let artifact = selection.artifact_name();

    eprintln!("Downloading and loading map: {artifact}");
    let local = fetcher(&cfg)?
        .fetch(&artifact)
        .map_err(|e| anyhow::anyhow!("{}", Notice::from_fetch_error(&e).text()))?;

    let out = match args.out {
        Some(p) => p,
        None => tempfile::Builder::new()
            .prefix("hiphop-map-page-")
            .suffix(".html")
            .tempfile()
            .context("create page file")?
            .keep()
            .context("keep page file")?
            .1,
    };
    let opts = RenderOptions {
        frame_height: args.height.unwrap_or(cfg.frame_height),
        include_intro: !args.no_intro,
    };
    render::render_to_file(&local, &selection, &out, &opts)
        .map_err(|e| anyhow::anyhow!("{}", Notice::render_failed(e).text()))?;

    println!("{}", out.display());
    Ok(())
}
