use netlogd_core::kernel::{Application, Cli, Error};

fn main() {
    let cli = Cli::parse_args();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build the current-thread runtime");

    let exit_code = runtime.block_on(run(cli));
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    let mut app = match Application::bootstrap(cli).await {
        Ok(app) => app,
        Err(err @ Error::Logger(_)) => {
            eprintln!("netlogd: {err}");
            return 2;
        }
        Err(err) => {
            eprintln!("netlogd: {err}");
            return 1;
        }
    };

    match app.run().await {
        Ok(()) => 0,
        Err(err) => {
            log::error!("fatal: {err}");
            1
        }
    }
}
