use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = kmz_search::Args::parse();

	kmz_search::run(args).await
}
