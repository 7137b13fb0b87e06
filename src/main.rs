use clap::Parser;
use loyalty::prelude::*;

#[tokio::main]
async fn main() {
    init_tracing();
    let config = AppConfig::parse();

    CliApp::new("loyalty")
        .with_shutdown_grace(config.shutdown_grace())
        .run(|writer, shutdown| async move {
            run_service(config, writer, shutdown).await?;
            Ok(())
        })
        .await
}
