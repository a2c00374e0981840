use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::queue::Event;
use crate::handlers::responder::ChatResponder;
use crate::service::agent::MeetingAgent;
use crate::service::routing;

// Single worker: chat turns run one at a time, so each message causes at
// most one in-flight call per external service.
pub async fn run_event_worker(
    mut rx: mpsc::Receiver<Event>,
    agent: Arc<MeetingAgent>,
    responder: Arc<dyn ChatResponder>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            Event::MessageReceived {
                target,
                sender,
                text,
            } => {
                let turn_id = Uuid::new_v4();
                println!("[{}] Message from {}: {}", turn_id, sender, text);

                // Help and status answers are local; the model is never
                // involved.
                let reply = if routing::is_help_command(&text) {
                    routing::help_message()
                } else if routing::is_status_command(&text) {
                    routing::status_message()
                } else {
                    agent.handle_user_message(&text).await
                };

                println!("[{}] Reply: {}", turn_id, reply);
                if let Err(err) = responder.send_text(&target, &reply).await {
                    eprintln!("[{}] Failed to deliver reply: {}", turn_id, err);
                }
            }
        }
    }
}
