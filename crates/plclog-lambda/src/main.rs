// Lambda bootstrap binary
//
// Build with: cargo build -p plclog-lambda --release

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    plclog_lambda::run().await
}
