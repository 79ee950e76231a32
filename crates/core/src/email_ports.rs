//! Email client port interfaces

use async_trait::async_trait;
use cadence_domain::{Message, MessageQuery, Result, Thread};

use crate::context::CallContext;

/// Trait for mailbox read operations
#[async_trait]
pub trait EmailClient: Send + Sync {
    /// Fetch a thread by id
    async fn get_thread(&self, ctx: &CallContext, grant_id: &str, thread_id: &str)
        -> Result<Thread>;

    /// List messages matching the query
    async fn get_messages(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<Message>>;
}
