//! Stream a workflow run and print node progress.
//!
//! Set DIFY_API_KEY and run:
//!   cargo run --example workflow

use dify_client::{ClientConfig, WorkflowClient};
use dify_types::{StreamPayload, WorkflowRequest};
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let workflow = WorkflowClient::new(ClientConfig::from_env()?)?;
    let events = workflow
        .run_stream(WorkflowRequest::new().input("query", "hello"))
        .await?
        .into_stream();
    let mut events = std::pin::pin!(events);

    while let Some(payload) = events.next().await {
        match payload? {
            StreamPayload::WorkflowStarted(ev) => println!("run {} started", ev.workflow_run_id),
            StreamPayload::NodeStarted(ev) => println!("  {} ...", ev.data.title),
            StreamPayload::NodeFinished(ev) => {
                println!("  {} {} ({:.2}s)", ev.data.title, ev.data.status, ev.data.elapsed_time);
            }
            StreamPayload::WorkflowFinished(ev) => {
                println!("finished: {}", ev.data.status);
                for (name, value) in &ev.data.outputs {
                    println!("  {name} = {value}");
                }
            }
            _ => {}
        }
    }

    Ok(())
}
