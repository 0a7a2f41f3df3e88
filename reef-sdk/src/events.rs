//! Wire frames of the push-notification socket and the typed events the
//! listener delivers.
//!
//! The server does not tag its frames with an explicit discriminant; the
//! kind of a frame is decided by which keys are present, checked in a fixed
//! priority order. A frame matching no known shape is silently dropped so
//! that server-side additions never break an older client.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{Address, PublicKey};

/// A named category of real-time event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerChannel {
    Block,
    ConfirmedAdded,
    UnconfirmedAdded,
    UnconfirmedRemoved,
    PartialAdded,
    PartialRemoved,
    Cosignature,
    Status,
}

impl ListenerChannel {
    /// The channel name as it appears in subscribe topics and frame metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::ConfirmedAdded => "confirmedAdded",
            Self::UnconfirmedAdded => "unconfirmedAdded",
            Self::UnconfirmedRemoved => "unconfirmedRemoved",
            Self::PartialAdded => "partialAdded",
            Self::PartialRemoved => "partialRemoved",
            Self::Cosignature => "cosignature",
            Self::Status => "status",
        }
    }

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "block" => Some(Self::Block),
            "confirmedAdded" => Some(Self::ConfirmedAdded),
            "unconfirmedAdded" => Some(Self::UnconfirmedAdded),
            "unconfirmedRemoved" => Some(Self::UnconfirmedRemoved),
            "partialAdded" => Some(Self::PartialAdded),
            "partialRemoved" => Some(Self::PartialRemoved),
            "cosignature" => Some(Self::Cosignature),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

impl fmt::Display for ListenerChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a newly harvested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub height: u64,
    pub hash: Option<String>,
    pub generation_hash: Option<String>,
    pub signer_public_key: Option<PublicKey>,
}

/// A transaction announced on one of the transaction channels.
///
/// The body stays raw JSON: decoding it into a full transaction model is
/// the serialization codec's job, not the listener's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub channel: ListenerChannel,
    pub hash: Option<String>,
    pub height: Option<u64>,
    pub signer_address: Option<Address>,
    pub recipient_address: Option<Address>,
    pub transaction: Value,
}

/// A transaction that was rejected, with the node's status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatusError {
    pub address: Option<Address>,
    pub hash: String,
    pub code: String,
    pub deadline: u64,
}

/// A cosignature added to a pending aggregate transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosignatureInfo {
    pub parent_hash: String,
    pub signature: String,
    pub signer_public_key: PublicKey,
}

/// Every event a subscription stream can deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Block(BlockInfo),
    Transaction(TransactionInfo),
    /// A bare hash notification, used by the removal channels.
    TransactionHash {
        channel: ListenerChannel,
        hash: String,
    },
    Status(TransactionStatusError),
    Cosignature(CosignatureInfo),
}

/// The subscribe control frame, sent once per `(channel, address)` key.
#[derive(Debug, Serialize)]
pub(crate) struct SubscribeMessage<'a> {
    pub uid: &'a str,
    pub subscribe: &'a str,
}

/// The matching unsubscribe control frame.
#[derive(Debug, Serialize)]
pub(crate) struct UnsubscribeMessage<'a> {
    pub uid: &'a str,
    pub unsubscribe: &'a str,
}

/// A classified inbound frame.
#[derive(Debug)]
pub(crate) enum WireMessage {
    Handshake { uid: String },
    Transaction(TransactionInfo),
    Block(BlockInfo),
    Status(TransactionStatusError),
    HashNotification { channel: ListenerChannel, hash: String },
    Cosignature(CosignatureInfo),
    Unrecognized,
}

/// Keys whose presence marks a frame as a payload rather than a handshake.
const PAYLOAD_KEYS: [&str; 5] = ["transaction", "block", "status", "meta", "parentHash"];

/// Classifies a raw frame by structural shape, in priority order. Anything
/// malformed or unknown comes back as `Unrecognized` and is dropped by the
/// caller.
pub(crate) fn classify(text: &str) -> WireMessage {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("dropping non-JSON frame: {e}");
            return WireMessage::Unrecognized;
        }
    };
    let Some(object) = value.as_object() else {
        return WireMessage::Unrecognized;
    };

    if object.contains_key("uid")
        && !PAYLOAD_KEYS.iter().any(|key| object.contains_key(*key))
    {
        return match object.get("uid").and_then(Value::as_str) {
            Some(uid) => WireMessage::Handshake {
                uid: uid.to_owned(),
            },
            None => WireMessage::Unrecognized,
        };
    }
    if object.contains_key("transaction") {
        return decode_transaction(value);
    }
    if object.contains_key("block") {
        return decode_block(value);
    }
    if object.contains_key("status") {
        return decode_status(value);
    }
    if object.contains_key("meta") {
        return decode_hash_notification(value);
    }
    if object.contains_key("parentHash") {
        return decode_cosignature(value);
    }
    WireMessage::Unrecognized
}

#[derive(Deserialize)]
struct TransactionMetaDto {
    #[serde(rename = "channelName")]
    channel_name: String,
    hash: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    height: Option<u64>,
}

#[derive(Deserialize)]
struct TransactionEnvelope {
    transaction: Value,
    meta: TransactionMetaDto,
}

fn decode_transaction(value: Value) -> WireMessage {
    let envelope: TransactionEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("dropping malformed transaction frame: {e}");
            return WireMessage::Unrecognized;
        }
    };
    let Some(channel) = ListenerChannel::from_raw(&envelope.meta.channel_name) else {
        tracing::debug!(
            channel = %envelope.meta.channel_name,
            "dropping transaction frame for unknown channel"
        );
        return WireMessage::Unrecognized;
    };
    let signer_address = envelope
        .transaction
        .get("signerAddress")
        .and_then(Value::as_str)
        .map(Address::new);
    let recipient_address = envelope
        .transaction
        .get("recipientAddress")
        .and_then(Value::as_str)
        .map(Address::new);
    WireMessage::Transaction(TransactionInfo {
        channel,
        hash: envelope.meta.hash,
        height: envelope.meta.height,
        signer_address,
        recipient_address,
        transaction: envelope.transaction,
    })
}

#[derive(Deserialize)]
struct BlockBodyDto {
    #[serde(deserialize_with = "de_u64")]
    height: u64,
    #[serde(rename = "signerPublicKey")]
    signer_public_key: Option<PublicKey>,
}

#[derive(Deserialize, Default)]
struct BlockMetaDto {
    hash: Option<String>,
    #[serde(rename = "generationHash")]
    generation_hash: Option<String>,
}

#[derive(Deserialize)]
struct BlockEnvelope {
    block: BlockBodyDto,
    #[serde(default)]
    meta: BlockMetaDto,
}

fn decode_block(value: Value) -> WireMessage {
    let envelope: BlockEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("dropping malformed block frame: {e}");
            return WireMessage::Unrecognized;
        }
    };
    WireMessage::Block(BlockInfo {
        height: envelope.block.height,
        hash: envelope.meta.hash,
        generation_hash: envelope.meta.generation_hash,
        signer_public_key: envelope.block.signer_public_key,
    })
}

#[derive(Deserialize)]
struct StatusEnvelope {
    hash: String,
    #[serde(rename = "status")]
    code: String,
    #[serde(deserialize_with = "de_u64")]
    deadline: u64,
    address: Option<Address>,
}

fn decode_status(value: Value) -> WireMessage {
    let envelope: StatusEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("dropping malformed status frame: {e}");
            return WireMessage::Unrecognized;
        }
    };
    WireMessage::Status(TransactionStatusError {
        address: envelope.address,
        hash: envelope.hash,
        code: envelope.code,
        deadline: envelope.deadline,
    })
}

#[derive(Deserialize)]
struct HashNotificationEnvelope {
    meta: TransactionMetaDto,
}

fn decode_hash_notification(value: Value) -> WireMessage {
    let envelope: HashNotificationEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("dropping malformed hash notification: {e}");
            return WireMessage::Unrecognized;
        }
    };
    let channel = ListenerChannel::from_raw(&envelope.meta.channel_name);
    match (channel, envelope.meta.hash) {
        (Some(channel), Some(hash)) => WireMessage::HashNotification { channel, hash },
        _ => WireMessage::Unrecognized,
    }
}

#[derive(Deserialize)]
struct CosignatureEnvelope {
    #[serde(rename = "parentHash")]
    parent_hash: String,
    signature: String,
    #[serde(rename = "signerPublicKey")]
    signer_public_key: PublicKey,
}

fn decode_cosignature(value: Value) -> WireMessage {
    let envelope: CosignatureEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("dropping malformed cosignature frame: {e}");
            return WireMessage::Unrecognized;
        }
    };
    WireMessage::Cosignature(CosignatureInfo {
        parent_hash: envelope.parent_hash,
        signature: envelope.signature,
        signer_public_key: envelope.signer_public_key,
    })
}

/// The REST gateway renders 64-bit values as strings; accept both forms.
fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => {
            s.parse().map(Some).map_err(serde::de::Error::custom)
        }
    }
}
