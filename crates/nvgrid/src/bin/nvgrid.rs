#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let result = nvgrid::client::run().await;

    // The terminal guard is gone by now; make sure nothing is left buffered before an
    // error gets printed
    use std::io::{self, Write};
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    result
}
