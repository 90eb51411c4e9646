use std::process::ExitCode;

use tracing::{error, info};

use article_search::{demo, logging, AppError, Dependencies};

async fn run() -> Result<(), AppError> {
    let dependencies = Dependencies::new().await?;

    demo::run(&dependencies.client, &dependencies.index).await?;

    dependencies.client.close();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; variables may come from the environment.
    dotenv::dotenv().ok();
    logging::init();

    info!("Starting article search demo");

    match run().await {
        Ok(()) => {
            info!("Demo completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, pre_flight = e.is_pre_flight(), "Demo failed");
            ExitCode::FAILURE
        }
    }
}
