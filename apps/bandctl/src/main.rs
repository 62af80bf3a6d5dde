mod config;
mod render;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    BandSource, BandUpdater, ChannelNavigator, DetailView, DetailViewState, EditWorkflow,
    FallbackBandSource, Field, HttpBandClient, Route, SubmitOutcome, WorkflowOptions,
    WorkflowPhase,
};
use shared::domain::{BandId, Genre};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse and edit bands in the band directory")]
struct Args {
    /// Overrides the api base url from settings.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a band's detail page.
    Show { band_id: String },
    /// Load a band, apply the given field changes and submit them.
    Edit {
        band_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_genre)]
        genre: Option<Genre>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        formed_year: Option<String>,
    },
}

fn parse_genre(value: &str) -> Result<Genre, String> {
    value.parse::<Genre>().map_err(|err| err.to_string())
}

struct Backend {
    source: Arc<dyn BandSource>,
    updater: Arc<dyn BandUpdater>,
}

fn connect(settings: &config::Settings) -> Result<Backend> {
    let primary = Arc::new(
        HttpBandClient::new(&settings.api_url)
            .with_context(|| format!("invalid api url {}", settings.api_url))?,
    );
    let updater: Arc<dyn BandUpdater> = primary.clone();

    let source: Arc<dyn BandSource> = match &settings.fallback_api_url {
        Some(fallback_url) => {
            let fallback = HttpBandClient::new(fallback_url)
                .with_context(|| format!("invalid fallback api url {fallback_url}"))?;
            info!(primary = %settings.api_url, fallback = %fallback_url, "racing band reads");
            Arc::new(FallbackBandSource::new(primary, Arc::new(fallback)))
        }
        None => primary,
    };

    Ok(Backend { source, updater })
}

async fn show(source: Arc<dyn BandSource>, band_id: BandId) -> ExitCode {
    let view = DetailView::new(source);
    view.show(band_id).await;
    let state = view.view_state();
    print!("{}", render::detail(&state));
    match state {
        DetailViewState::Loaded(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

async fn edit(
    backend: Backend,
    settings: &config::Settings,
    band_id: BandId,
    changes: Vec<(Field, String)>,
) -> ExitCode {
    let (navigator, mut routes) = ChannelNavigator::new();
    let workflow = EditWorkflow::with_options(
        backend.source.clone(),
        backend.updater,
        Arc::new(navigator),
        WorkflowOptions {
            navigation_delay: settings.navigation_delay(),
            current_year: None,
        },
    );

    workflow.mount(band_id).await;
    if workflow.phase() == WorkflowPhase::NotFound {
        print!("{}", render::edit(&workflow.view_state()));
        return ExitCode::FAILURE;
    }

    for (field, value) in changes {
        workflow.edit(field, value);
    }

    let outcome = workflow.submit().await;
    print!("{}", render::edit(&workflow.view_state()));

    match outcome {
        SubmitOutcome::Updated => {}
        SubmitOutcome::Failed(err) => {
            warn!(error = %err, "update rejected");
            return ExitCode::FAILURE;
        }
        other => {
            warn!(outcome = ?other, "band was not updated");
            return ExitCode::FAILURE;
        }
    }

    match routes.recv().await {
        Some(Route::BandDetail(band_id)) => {
            println!();
            show(backend.source, band_id).await
        }
        Some(route) => {
            info!(%route, "unexpected route after update");
            ExitCode::SUCCESS
        }
        None => ExitCode::SUCCESS,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    let backend = connect(&settings)?;

    let code = match args.command {
        Command::Show { band_id } => show(backend.source, BandId::new(band_id)).await,
        Command::Edit {
            band_id,
            name,
            genre,
            description,
            formed_year,
        } => {
            let changes = [
                (Field::Name, name),
                (Field::Genre, genre.map(|genre| genre.as_str().to_string())),
                (Field::Description, description),
                (Field::FormedYear, formed_year),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| (field, value)))
            .collect();
            edit(backend, &settings, BandId::new(band_id), changes).await
        }
    };
    Ok(code)
}
