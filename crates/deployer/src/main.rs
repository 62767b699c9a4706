use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing `.env` is fine, everything can come from the environment.
    dotenv::dotenv().ok();
    let args = deployer::arguments::Arguments::parse();

    let mut config = observe::Config::new(
        &args.log_filter,
        args.log_stderr_threshold.into_level(),
        false,
    );
    if args.log_json {
        config = config.with_json_format();
    }
    observe::tracing::initialize(&config);
    tracing::info!("running deployer with validated arguments:\n{}", args);

    deployer::run(args).await?;
    Ok(())
}
