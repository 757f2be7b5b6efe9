//! Streaming chat against a Dify chat app.
//!
//! Set DIFY_API_KEY (and DIFY_BASE_URL for self-hosted instances) and run:
//!   cargo run --example chat -- "What can you do?"

use std::io::Write;

use dify_client::{ChatClient, ClientConfig};
use dify_types::{ChatRequest, StreamPayload};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in one sentence.".into());

    let chat = ChatClient::new(ClientConfig::from_env()?)?;
    let mut reader = chat
        .send_message_stream(ChatRequest::new(query).user("example-user"))
        .await?;

    let mut conversation_id = String::new();
    while let Some(payload) = reader.next_payload().await? {
        match payload {
            StreamPayload::Message(msg) => {
                print!("{}", msg.answer);
                std::io::stdout().flush()?;
                conversation_id = msg.conversation_id;
            }
            StreamPayload::MessageEnd(end) => {
                println!();
                println!("Tokens: {}", end.metadata.usage.total_tokens);
            }
            StreamPayload::Error(err) => {
                eprintln!("server error: {} ({})", err.message, err.code);
            }
            _ => {}
        }
    }
    reader.close();

    let recent = chat.conversations("example-user", None, Some(5), None).await?;
    println!("Recent conversations: {}", recent.data.len());
    println!("Conversation: {conversation_id}");

    Ok(())
}
