use tokio::sync::mpsc;

// Where a chat message came from, and where the reply must go back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatTarget {
    Telegram { chat_id: i64 },
    WhatsApp { wa_id: String },
}

#[derive(Debug)]
pub enum Event {
    MessageReceived {
        target: ChatTarget,
        sender: String,
        text: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::Sender<Event>,
}

impl EventBus {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    pub async fn emit(&self, event: Event) {
        let _ = self.tx.send(event).await;
    }
}
