mod chain;
mod config;
mod plan;
mod run;

#[tokio::main]
async fn main() {
    let result = run::run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1)
    }
}
