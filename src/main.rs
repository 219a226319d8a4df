use std::{process, sync::Arc};

use galleria::{
    application::GalleryApi,
    config::{self, Command},
    infra::{api::HttpGalleryApi, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

mod commands;
mod print;
#[cfg(test)]
mod tests;

use commands::{CliError, Session};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_error(&error);
        process::exit(1);
    }
}

fn report_error(error: &CliError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "galleria failed");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "galleria failed");
    });
}

async fn run() -> Result<(), CliError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let api: Arc<dyn GalleryApi> = Arc::new(HttpGalleryApi::from_settings(&settings.api)?);
    let session = Session::new(&settings, api);

    match cli_args.command {
        Command::Search(args) => print::print_json(&commands::search(&session, args).await?),
        Command::Tags(args) => print::print_json(&commands::tags(&session, args).await?),
        Command::PostTags(args) => print::print_json(&commands::post_tags(&session, args).await?),
    }
}
