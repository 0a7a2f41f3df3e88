//! # Real-Time Listener
//!
//! One persistent message-socket connection, presented as independent typed
//! notification streams keyed by `(channel, address)`.
//!
//! ## Lifecycle
//!
//! A listener starts closed. [`Listener::open`] establishes the connection
//! and resolves once the server's handshake frame has delivered the session
//! `uid`; only then do subscriptions succeed. [`Listener::close`] tears the
//! connection down, clears the `uid` and every subscription, and is safe to
//! call at any time. A socket failure while open is delivered as an error on
//! every live stream and leaves the listener closed — reconnecting is the
//! caller's policy, never this component's.
//!
//! ## Subscription registry
//!
//! The registry is shared mutable state: observers may be added from any
//! task while frames are being dispatched. Insertion goes through the map's
//! per-key entry lock, so the decision "is this the first observer for the
//! key" — which is what triggers the subscribe control frame — cannot race.
//! Dispatch clones the observer list out of the map before awaiting sends,
//! so a slow consumer never blocks new subscriptions on other keys.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future;
use futures::stream::Stream;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::config::SdkConfig;
use crate::error::{ListenerError, SocketError};
use crate::events::{
    classify, BlockInfo, CosignatureInfo, ListenerChannel, ListenerEvent, SubscribeMessage,
    TransactionInfo, TransactionStatusError, UnsubscribeMessage, WireMessage,
};
use crate::model::Address;
use crate::transport::{Connection, MessageTransport, WebSocketTransport};

/// Identifies one server-side subscription: a channel, optionally scoped to
/// an address. Unscoped channels (new blocks) use `address: None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub channel: ListenerChannel,
    pub address: Option<Address>,
}

impl SubscriptionKey {
    /// The topic string used in subscribe/unsubscribe control frames.
    pub fn topic(&self) -> String {
        match &self.address {
            Some(address) => format!("{}/{}", self.channel.as_str(), address.plain()),
            None => self.channel.as_str().to_owned(),
        }
    }
}

type Observer = mpsc::Sender<Result<ListenerEvent, ListenerError>>;

struct ListenerShared {
    /// Present exactly while the connection is open.
    uid: RwLock<Option<String>>,
    subscriptions: DashMap<SubscriptionKey, Vec<Observer>>,
    /// Sender feeding the write pump; dropping it closes the socket.
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    /// Resolves the in-flight `open()` once the handshake arrives.
    pending_open: Mutex<Option<oneshot::Sender<String>>>,
    subscription_buffer: usize,
}

/// A stateful client over a persistent message socket.
pub struct Listener {
    transport: Arc<dyn MessageTransport>,
    shared: Arc<ListenerShared>,
    open_guard: tokio::sync::Mutex<()>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl Listener {
    /// Creates a closed listener over the given transport.
    pub fn new(transport: Arc<dyn MessageTransport>, config: &SdkConfig) -> Self {
        Self {
            transport,
            shared: Arc::new(ListenerShared {
                uid: RwLock::new(None),
                subscriptions: DashMap::new(),
                outbound: Mutex::new(None),
                pending_open: Mutex::new(None),
                subscription_buffer: config.channels.subscription_buffer,
            }),
            open_guard: tokio::sync::Mutex::new(()),
            reader_task: Mutex::new(None),
        }
    }

    /// Creates a closed listener over the default WebSocket transport.
    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(Arc::new(WebSocketTransport::from_config(config)), config)
    }

    /// The session id assigned by the server handshake, present while open.
    pub fn uid(&self) -> Option<String> {
        self.shared.uid.read().clone()
    }

    pub fn is_open(&self) -> bool {
        self.shared.uid.read().is_some()
    }

    /// Establishes the connection and waits for the server handshake.
    ///
    /// A no-op when already open. On failure the listener is left closed
    /// and `open()` may simply be called again.
    pub async fn open(&self) -> Result<(), ListenerError> {
        let _guard = self.open_guard.lock().await;
        if self.shared.uid.read().is_some() {
            return Ok(());
        }

        let Connection { mut sink, mut inbound } = self
            .transport
            .connect()
            .await
            .map_err(ListenerError::Socket)?;

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (handshake_tx, handshake_rx) = oneshot::channel::<String>();
        *self.shared.pending_open.lock() = Some(handshake_tx);
        *self.shared.outbound.lock() = Some(outbound_tx);

        // Write pump: forwards control frames and closes the socket once
        // the listener drops its outbound sender.
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(frame).await {
                    tracing::warn!("failed to send control frame: {e}");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Dispatch pump: classifies and routes every inbound frame.
        let shared = Arc::clone(&self.shared);
        let reader = tokio::spawn(async move {
            loop {
                match inbound.recv().await {
                    Some(Ok(text)) => shared.dispatch_frame(&text).await,
                    Some(Err(e)) => {
                        shared.tear_down(Some(e)).await;
                        break;
                    }
                    None => {
                        shared.tear_down(Some(SocketError::Closed)).await;
                        break;
                    }
                }
            }
        });
        if let Some(previous) = self.reader_task.lock().replace(reader) {
            previous.abort();
        }

        match handshake_rx.await {
            Ok(uid) => {
                tracing::debug!(uid = %uid, "listener connection established");
                Ok(())
            }
            Err(_) => Err(ListenerError::HandshakeFailed {
                reason: "connection closed before the handshake frame arrived".to_owned(),
            }),
        }
    }

    /// Tears down the connection and clears the session id and every
    /// subscription. Idempotent; never fails.
    pub fn close(&self) {
        self.shared.pending_open.lock().take();
        // Dropping the sender ends the write pump, which closes the socket.
        self.shared.outbound.lock().take();
        self.shared.uid.write().take();
        self.shared.subscriptions.clear();
        if let Some(reader) = self.reader_task.lock().take() {
            reader.abort();
        }
    }

    /// Subscribes to a channel, optionally scoped to an address, and returns
    /// the stream of every event routed to that key.
    ///
    /// Fails synchronously with [`ListenerError::NotOpen`] while the
    /// connection is not established. The first observer of a key sends the
    /// subscribe control frame; further observers share the existing
    /// server-side subscription.
    pub fn subscribe(
        &self,
        channel: ListenerChannel,
        address: Option<Address>,
    ) -> Result<impl Stream<Item = Result<ListenerEvent, ListenerError>> + Send + Unpin, ListenerError>
    {
        let receiver = self.subscribe_key(SubscriptionKey { channel, address }, "subscribe")?;
        Ok(ReceiverStream::new(receiver))
    }

    /// The stream of newly harvested blocks (an unscoped channel).
    pub fn new_block(
        &self,
    ) -> Result<impl Stream<Item = Result<BlockInfo, ListenerError>> + Send + Unpin, ListenerError>
    {
        let receiver = self.subscribe_key(
            SubscriptionKey {
                channel: ListenerChannel::Block,
                address: None,
            },
            "new_block",
        )?;
        Ok(ReceiverStream::new(receiver).filter_map(|item| match item {
            Ok(ListenerEvent::Block(block)) => Some(Ok(block)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }))
    }

    /// Transactions confirmed for the given address.
    pub fn confirmed(
        &self,
        address: Address,
    ) -> Result<
        impl Stream<Item = Result<TransactionInfo, ListenerError>> + Send + Unpin,
        ListenerError,
    > {
        self.transaction_stream(ListenerChannel::ConfirmedAdded, address, "confirmed")
    }

    /// Transactions entering the unconfirmed pool for the given address.
    pub fn unconfirmed_added(
        &self,
        address: Address,
    ) -> Result<
        impl Stream<Item = Result<TransactionInfo, ListenerError>> + Send + Unpin,
        ListenerError,
    > {
        self.transaction_stream(
            ListenerChannel::UnconfirmedAdded,
            address,
            "unconfirmed_added",
        )
    }

    /// Hashes of transactions leaving the unconfirmed pool.
    pub fn unconfirmed_removed(
        &self,
        address: Address,
    ) -> Result<impl Stream<Item = Result<String, ListenerError>> + Send + Unpin, ListenerError>
    {
        self.hash_stream(
            ListenerChannel::UnconfirmedRemoved,
            address,
            "unconfirmed_removed",
        )
    }

    /// Aggregate-bonded transactions added for the given address.
    pub fn partial_added(
        &self,
        address: Address,
    ) -> Result<
        impl Stream<Item = Result<TransactionInfo, ListenerError>> + Send + Unpin,
        ListenerError,
    > {
        self.transaction_stream(ListenerChannel::PartialAdded, address, "partial_added")
    }

    /// Hashes of aggregate-bonded transactions removed for the address.
    pub fn partial_removed(
        &self,
        address: Address,
    ) -> Result<impl Stream<Item = Result<String, ListenerError>> + Send + Unpin, ListenerError>
    {
        self.hash_stream(ListenerChannel::PartialRemoved, address, "partial_removed")
    }

    /// Cosignatures added to pending aggregates involving the address.
    pub fn cosignature_added(
        &self,
        address: Address,
    ) -> Result<
        impl Stream<Item = Result<CosignatureInfo, ListenerError>> + Send + Unpin,
        ListenerError,
    > {
        let receiver = self.subscribe_key(
            SubscriptionKey {
                channel: ListenerChannel::Cosignature,
                address: Some(address),
            },
            "cosignature_added",
        )?;
        Ok(ReceiverStream::new(receiver).filter_map(|item| match item {
            Ok(ListenerEvent::Cosignature(cosignature)) => Some(Ok(cosignature)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }))
    }

    /// Rejection notices for transactions signed by the address.
    pub fn status(
        &self,
        address: Address,
    ) -> Result<
        impl Stream<Item = Result<TransactionStatusError, ListenerError>> + Send + Unpin,
        ListenerError,
    > {
        let receiver = self.subscribe_key(
            SubscriptionKey {
                channel: ListenerChannel::Status,
                address: Some(address),
            },
            "status",
        )?;
        Ok(ReceiverStream::new(receiver).filter_map(|item| match item {
            Ok(ListenerEvent::Status(status)) => Some(Ok(status)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }))
    }

    fn transaction_stream(
        &self,
        channel: ListenerChannel,
        address: Address,
        operation: &'static str,
    ) -> Result<
        impl Stream<Item = Result<TransactionInfo, ListenerError>> + Send + Unpin,
        ListenerError,
    > {
        let receiver = self.subscribe_key(
            SubscriptionKey {
                channel,
                address: Some(address),
            },
            operation,
        )?;
        Ok(ReceiverStream::new(receiver).filter_map(|item| match item {
            Ok(ListenerEvent::Transaction(transaction)) => Some(Ok(transaction)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }))
    }

    fn hash_stream(
        &self,
        channel: ListenerChannel,
        address: Address,
        operation: &'static str,
    ) -> Result<impl Stream<Item = Result<String, ListenerError>> + Send + Unpin, ListenerError>
    {
        let receiver = self.subscribe_key(
            SubscriptionKey {
                channel,
                address: Some(address),
            },
            operation,
        )?;
        Ok(ReceiverStream::new(receiver).filter_map(|item| match item {
            Ok(ListenerEvent::TransactionHash { hash, .. }) => Some(Ok(hash)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }))
    }

    /// Registers an observer under `key`; sends the subscribe control frame
    /// iff the observer is the first one for the key. The registry entry
    /// lock makes that decision atomic under concurrent calls.
    fn subscribe_key(
        &self,
        key: SubscriptionKey,
        operation: &'static str,
    ) -> Result<mpsc::Receiver<Result<ListenerEvent, ListenerError>>, ListenerError> {
        let uid = self
            .shared
            .uid
            .read()
            .clone()
            .ok_or(ListenerError::NotOpen { operation })?;

        let (observer_tx, observer_rx) = mpsc::channel(self.shared.subscription_buffer);
        let first_for_key = match self.shared.subscriptions.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().push(observer_tx);
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(vec![observer_tx]);
                true
            }
        };

        if first_for_key {
            let topic = key.topic();
            let frame = serde_json::to_string(&SubscribeMessage {
                uid: &uid,
                subscribe: &topic,
            })
            .expect("control frames serialize");
            tracing::debug!(topic = %topic, "subscribing");
            self.shared.send_control(frame);
        }
        Ok(observer_rx)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.close();
    }
}

impl ListenerShared {
    fn send_control(&self, frame: String) {
        if let Some(outbound) = self.outbound.lock().as_ref() {
            if outbound.send(frame).is_err() {
                tracing::warn!("write pump is gone, dropping control frame");
            }
        }
    }

    async fn dispatch_frame(&self, text: &str) {
        match classify(text) {
            WireMessage::Handshake { uid } => {
                tracing::debug!(uid = %uid, "handshake received");
                *self.uid.write() = Some(uid.clone());
                if let Some(pending) = self.pending_open.lock().take() {
                    let _ = pending.send(uid);
                }
            }
            WireMessage::Transaction(transaction) => {
                let mut keys = vec![SubscriptionKey {
                    channel: transaction.channel,
                    address: None,
                }];
                for address in [&transaction.signer_address, &transaction.recipient_address]
                    .into_iter()
                    .flatten()
                {
                    let key = SubscriptionKey {
                        channel: transaction.channel,
                        address: Some(address.clone()),
                    };
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                self.deliver_to_keys(&keys, ListenerEvent::Transaction(transaction))
                    .await;
            }
            WireMessage::Block(block) => {
                let key = SubscriptionKey {
                    channel: ListenerChannel::Block,
                    address: None,
                };
                self.deliver_to_keys(&[key], ListenerEvent::Block(block)).await;
            }
            WireMessage::Status(status) => match status.address.clone() {
                Some(address) => {
                    let key = SubscriptionKey {
                        channel: ListenerChannel::Status,
                        address: Some(address),
                    };
                    self.deliver_to_keys(&[key], ListenerEvent::Status(status)).await;
                }
                // Without the owning address the notice goes to every
                // status observer.
                None => {
                    self.deliver_to_channel(ListenerChannel::Status, ListenerEvent::Status(status))
                        .await;
                }
            },
            WireMessage::HashNotification { channel, hash } => {
                self.deliver_to_channel(channel, ListenerEvent::TransactionHash { channel, hash })
                    .await;
            }
            WireMessage::Cosignature(cosignature) => {
                self.deliver_to_channel(
                    ListenerChannel::Cosignature,
                    ListenerEvent::Cosignature(cosignature),
                )
                .await;
            }
            WireMessage::Unrecognized => {
                tracing::trace!("ignoring unrecognized frame");
            }
        }
    }

    /// Delivers `event` to every observer of every given key.
    async fn deliver_to_keys(&self, keys: &[SubscriptionKey], event: ListenerEvent) {
        for key in keys {
            // Clone the observer list out of the map so no registry lock is
            // held across the sends.
            let observers: Vec<Observer> = match self.subscriptions.get(key) {
                Some(entry) => entry.value().clone(),
                None => continue,
            };
            let sends = observers
                .iter()
                .map(|observer| observer.send(Ok(event.clone())));
            let results = future::join_all(sends).await;
            if results.iter().any(Result::is_err) {
                self.prune(key);
            }
        }
    }

    /// Delivers `event` to every observer of `channel`, whatever the address
    /// scope of their key.
    async fn deliver_to_channel(&self, channel: ListenerChannel, event: ListenerEvent) {
        let keys: Vec<SubscriptionKey> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.key().channel == channel)
            .map(|entry| entry.key().clone())
            .collect();
        self.deliver_to_keys(&keys, event).await;
    }

    /// Drops observers whose stream side is gone; when a key empties, the
    /// server-side subscription is released too.
    fn prune(&self, key: &SubscriptionKey) {
        if let Some(mut entry) = self.subscriptions.get_mut(key) {
            entry.retain(|observer| !observer.is_closed());
        }
        let emptied = self
            .subscriptions
            .remove_if(key, |_, observers| observers.is_empty())
            .is_some();
        if emptied {
            let Some(uid) = self.uid.read().clone() else {
                return;
            };
            let topic = key.topic();
            let frame = serde_json::to_string(&UnsubscribeMessage {
                uid: &uid,
                unsubscribe: &topic,
            })
            .expect("control frames serialize");
            tracing::debug!(topic = %topic, "releasing empty subscription");
            self.send_control(frame);
        }
    }

    /// Fails every live stream with `error` (when given) and resets the
    /// session to closed.
    async fn tear_down(&self, error: Option<SocketError>) {
        self.pending_open.lock().take();
        self.outbound.lock().take();
        self.uid.write().take();

        let keys: Vec<SubscriptionKey> = self
            .subscriptions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        let mut orphaned = Vec::new();
        for key in keys {
            if let Some((_, observers)) = self.subscriptions.remove(&key) {
                orphaned.extend(observers);
            }
        }
        if let Some(error) = error {
            tracing::warn!("socket failed, notifying {} observers: {error}", orphaned.len());
            for observer in orphaned {
                let _ = observer.send(Err(ListenerError::Socket(error.clone()))).await;
            }
        }
    }
}
