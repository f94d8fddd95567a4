use serde::{Deserialize, Serialize};

/// A reservation request buffered between intake and the booking worker.
///
/// The body is the caller's payload verbatim; the token is derived from
/// those bytes so identical submissions collapse in the queue, and the
/// group id serializes deliveries that must stay ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub body: String,
    pub dedup_token: String,
    pub group_id: String,
}

/// A booking transition event on its way to a handler.
///
/// `source` names the transition (`booking:confirmed` or
/// `booking:cancelled`); `detail` is the merged booking record, serialized,
/// reflecting the state the handler must apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub source: String,
    pub detail: String,
}
