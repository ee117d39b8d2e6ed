use ridgeline::api::ApiError;
use ridgeline::cli::run;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        // Transport and backend trouble anywhere in the chain is an
        // internal error; everything else is the user's to fix
        let is_backend_failure = e
            .chain()
            .any(|cause| cause.downcast_ref::<ApiError>().is_some());

        if is_backend_failure {
            eprintln!("Internal error: {}", e);
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut indent = 1;
                while let Some(err) = source {
                    eprintln!("{:indent$}  {}", "", err);
                    source = err.source();
                    indent += 1;
                }
            }
            std::process::exit(2);
        } else {
            // User error
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
