//! Blocking text generation against a Dify completion app.
//!
//! Set DIFY_API_KEY and run:
//!   cargo run --example completion

use dify_client::{ClientConfig, CompletionClient};
use dify_types::CompletionRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let completion = CompletionClient::new(ClientConfig::from_env()?)?;

    let params = completion.parameters("").await?;
    println!("Form fields: {}", params.user_input_form.len());

    let response = completion
        .send_message(CompletionRequest::new().input("query", "Write a haiku about Rust."))
        .await?;
    println!("{}", response.answer);

    Ok(())
}
