//! Short-lived Redis lock on an availability slot.
//!
//! Two HR users racing for the same slot are turned away with a 409 before
//! either opens a transaction. The unique index on
//! `interviews.availability_id` remains the authority if Redis is down.

use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError, Script};
use tracing::debug;
use uuid::Uuid;

/// Deletes the key only if it still holds our token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

pub fn lock_key(slot_id: i64) -> String {
    format!("hireeasy:slot-lock:{slot_id}")
}

pub enum LockOutcome {
    Acquired(SlotLock),
    Busy,
}

pub struct SlotLock {
    conn: MultiplexedConnection,
    key: String,
    token: String,
}

pub async fn try_acquire(client: &Client, slot_id: i64, ttl_ms: u64) -> Result<LockOutcome, RedisError> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let key = lock_key(slot_id);
    let token = Uuid::new_v4().to_string();

    let reply: Option<String> = redis::cmd("SET")
        .arg(&key)
        .arg(&token)
        .arg("NX")
        .arg("PX")
        .arg(ttl_ms)
        .query_async(&mut conn)
        .await?;

    if reply.is_some() {
        debug!("Acquired {key}");
        Ok(LockOutcome::Acquired(SlotLock { conn, key, token }))
    } else {
        Ok(LockOutcome::Busy)
    }
}

impl SlotLock {
    pub async fn release(mut self) -> Result<(), RedisError> {
        let _: i64 = Script::new(RELEASE_SCRIPT)
            .key(&self.key)
            .arg(&self.token)
            .invoke_async(&mut self.conn)
            .await?;
        debug!("Released {}", self.key);
        Ok(())
    }
}
