#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rs_sqs_silence_receiver::errors::ReceiverError;
use rs_sqs_silence_receiver::message::Message;
use rs_sqs_silence_receiver::transport::QueueTransport;
use tokio::time::Instant;

/// In-memory queue whose messages become visible at fixed offsets from creation.
#[derive(Clone)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptedState>>,
}

struct ScriptedState {
    origin: Instant,
    scheduled: VecDeque<(Duration, Message)>,
    acknowledged: Vec<String>,
    rejected_acks: HashSet<String>,
    failing_receives: usize,
    receive_calls: usize,
    queues: Vec<String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        ScriptedTransport {
            state: Arc::new(Mutex::new(ScriptedState {
                origin: Instant::now(),
                scheduled: VecDeque::new(),
                acknowledged: Vec::new(),
                rejected_acks: HashSet::new(),
                failing_receives: 0,
                receive_calls: 0,
                queues: Vec::new(),
            })),
        }
    }

    /// Makes a message with the given id and body visible `at` after creation.
    /// Messages must be scheduled in arrival order.
    pub fn schedule(&self, at: Duration, id: &str, body: &str) {
        let message = Message::new(id, body).with_receipt_handle(format!("rh-{}", id));
        self.state.lock().unwrap().scheduled.push_back((at, message));
    }

    pub fn schedule_every(&self, every: Duration, count: usize) {
        for i in 0..count {
            self.schedule(every * i as u32, &format!("m-{}", i), "tick");
        }
    }

    pub fn fail_next_receives(&self, count: usize) {
        self.state.lock().unwrap().failing_receives = count;
    }

    pub fn reject_ack(&self, id: &str) {
        self.state.lock().unwrap().rejected_acks.insert(id.to_string());
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.state.lock().unwrap().acknowledged.clone()
    }

    pub fn receive_calls(&self) -> usize {
        self.state.lock().unwrap().receive_calls
    }

    pub fn queues(&self) -> Vec<String> {
        self.state.lock().unwrap().queues.clone()
    }
}

#[async_trait]
impl QueueTransport for ScriptedTransport {
    async fn ensure_queue(&self, queue_name: &str) -> Result<String, ReceiverError> {
        let mut state = self.state.lock().unwrap();
        if !state.queues.iter().any(|q| q == queue_name) {
            state.queues.push(queue_name.to_string());
        }
        Ok(format!("https://sqs.test.local/000000000000/{}", queue_name))
    }

    async fn receive(
        &self,
        _queue_url: &str,
        wait: Duration,
    ) -> Result<Option<Message>, ReceiverError> {
        let now = Instant::now();
        let next_arrival = {
            let mut state = self.state.lock().unwrap();
            state.receive_calls += 1;
            if state.failing_receives > 0 {
                state.failing_receives -= 1;
                return Err(ReceiverError::ReceiveError("connection reset".to_string()));
            }
            let origin = state.origin;
            state.scheduled.front().map(|(at, _)| origin + *at)
        };

        match next_arrival {
            Some(arrival) if arrival <= now + wait => {
                tokio::time::sleep_until(arrival).await;
                Ok(self
                    .state
                    .lock()
                    .unwrap()
                    .scheduled
                    .pop_front()
                    .map(|(_, message)| message))
            }
            _ => {
                tokio::time::sleep(wait).await;
                Ok(None)
            }
        }
    }

    async fn acknowledge(&self, _queue_url: &str, message: &Message) -> Result<(), ReceiverError> {
        let mut state = self.state.lock().unwrap();
        if state.rejected_acks.contains(&message.message_id) {
            return Err(ReceiverError::AcknowledgeError {
                message_id: message.message_id.clone(),
                reason: "ReceiptHandleIsInvalid".to_string(),
            });
        }
        state.acknowledged.push(message.message_id.clone());
        Ok(())
    }
}

pub fn assert_about(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(50);
    assert!(
        actual >= expected && actual <= expected + slack,
        "expected about {:?}, got {:?}",
        expected,
        actual
    );
}
