use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use kmz_domain::SortSpec;
use kmz_service::{Paginate, SearchResults, SearchSession};

#[derive(Debug, Parser)]
#[command(
	version = kmz_cli::VERSION,
	rename_all = "kebab",
	styles = kmz_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Free-text query.
	#[arg(value_name = "QUERY")]
	pub query: Option<String>,
	/// Adds or replaces a structured filter.
	#[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_pair)]
	pub filters: Vec<(String, String)>,
	/// Sets the comparison operator for a filter field.
	#[arg(long = "modifier", value_name = "FIELD=OPERATOR", value_parser = parse_pair)]
	pub modifiers: Vec<(String, String)>,
	/// Sort token such as `item.price_>=`.
	#[arg(long, value_name = "TOKEN")]
	pub sort: Option<String>,
	#[arg(long, value_name = "CODE")]
	pub plus_code: Option<String>,
	/// Search radius; negative values disable radius-bound predicates.
	#[arg(long, value_name = "RADIUS", allow_hyphen_values = true)]
	pub radius: Option<f64>,
	/// Raw predicate appended after the generated ones.
	#[arg(long = "advanced", value_name = "PREDICATE")]
	pub advanced: Vec<String>,
	/// Fetches the following page after the first one.
	#[arg(long)]
	pub next: bool,
}

/// What the command prints for a finished search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a> {
	pub search_id: Uuid,
	pub response_status: Option<u16>,
	pub sort_indicator: &'a str,
	pub paginate: &'a Paginate,
	pub results: &'a SearchResults,
}
impl<'a> Page<'a> {
	pub fn of(session: &'a SearchSession) -> Self {
		Self {
			search_id: session.search_id(),
			response_status: session.response_status(),
			sort_indicator: session.state().sort_indicator(),
			paginate: session.paginate(),
			results: session.results(),
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = kmz_config::load(&args.config)?;

	init_tracing(&config)?;

	let mut session = SearchSession::new(config)?;

	search(&mut session, &args).await?;

	println!("{}", serde_json::to_string_pretty(&Page::of(&session))?);

	Ok(())
}

/// Applies the command-line overrides to the session and runs the search.
pub async fn search(session: &mut SearchSession, args: &Args) -> color_eyre::Result<()> {
	let state = session.state_mut();

	for (field, value) in &args.filters {
		state.filters.insert(field.clone(), Value::from(value.as_str()));
	}
	for (field, operator) in &args.modifiers {
		state.modifiers.insert(field.clone(), operator.clone());
	}
	if let Some(radius) = args.radius {
		state.location_radius = radius;
	}
	if let Some(code) = args.plus_code.as_ref() {
		state.plus_code = Some(code.clone());
	}
	if let Some(token) = args.sort.as_deref() {
		state.apply_sort(&SortSpec::parse(token)?);
	}

	state.advanced_search.extend(args.advanced.iter().cloned());

	session.execute(args.query.as_deref()).await?;

	if args.next {
		let movement = session.next_page().await?;

		tracing::info!(?movement, "Requested next page.");
	}

	Ok(())
}

fn init_tracing(config: &kmz_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
	let (key, value) =
		raw.split_once('=').ok_or_else(|| format!("Expected KEY=VALUE, got {raw:?}."))?;
	let key = key.trim();

	if key.is_empty() {
		return Err(format!("Missing key in {raw:?}."));
	}

	Ok((key.to_string(), value.to_string()))
}
