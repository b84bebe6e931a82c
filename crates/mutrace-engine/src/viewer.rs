//! Single-task event loop driving one incident subscription at a time.
//!
//! Commands from handles, channel frames and snapshot results all arrive on
//! one queue and are applied in arrival order. Background tasks never touch
//! the post collection; they only post tagged results back to the queue.

use std::sync::Arc;
use std::time::Instant;

use mutrace_core::config::EngineConfig;
use mutrace_core::errors::{ExError, MutraceError, Result};
use mutrace_core::merge::ConnectionPhase;
use mutrace_core::{apply, log_op_end, log_op_error, log_op_start, MergeEvent, MergeState, Post};
use mutrace_core_types::SubscriptionContext;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::source::IncidentSource;
use crate::view::IncidentView;
use crate::wire::{decode_message, ChannelMessage};

/// Requests accepted by a running viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Release any current subscription and subscribe to this incident
    Select(String),
    /// Release the current subscription and clear the view
    Deselect,
    /// Reopen the channel for the current incident and re-request its snapshot
    Reconnect,
    /// Stop the event loop
    Shutdown,
}

#[derive(Debug)]
enum Envelope {
    Command(Command),
    ChannelOpened(SubscriptionContext),
    ChannelFrame(SubscriptionContext, String),
    ChannelClosed(SubscriptionContext),
    Snapshot(SubscriptionContext, Result<Vec<Post>>),
    SubscribeFailed(SubscriptionContext, MutraceError),
}

impl Envelope {
    fn context(&self) -> Option<&SubscriptionContext> {
        match self {
            Envelope::Command(_) => None,
            Envelope::ChannelOpened(ctx)
            | Envelope::ChannelFrame(ctx, _)
            | Envelope::ChannelClosed(ctx)
            | Envelope::Snapshot(ctx, _)
            | Envelope::SubscribeFailed(ctx, _) => Some(ctx),
        }
    }
}

/// Cloneable front end of a running [`Viewer`]
#[derive(Clone)]
pub struct ViewerHandle {
    queue: mpsc::Sender<Envelope>,
    view: watch::Receiver<Option<IncidentView>>,
}

impl ViewerHandle {
    /// # Errors
    ///
    /// Returns `TransportError` if the event loop has stopped.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.queue
            .send(Envelope::Command(command))
            .await
            .map_err(|_| MutraceError::TransportError {
                incident_id: String::new(),
                reason: "viewer stopped".to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `TransportError` if the event loop has stopped.
    pub async fn select(&self, incident_id: impl Into<String>) -> Result<()> {
        self.send(Command::Select(incident_id.into())).await
    }

    /// # Errors
    ///
    /// Returns `TransportError` if the event loop has stopped.
    pub async fn deselect(&self) -> Result<()> {
        self.send(Command::Deselect).await
    }

    /// # Errors
    ///
    /// Returns `TransportError` if the event loop has stopped.
    pub async fn reconnect(&self) -> Result<()> {
        self.send(Command::Reconnect).await
    }

    /// # Errors
    ///
    /// Returns `TransportError` if the event loop has stopped.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Receiver that observes every published view
    pub fn subscribe(&self) -> watch::Receiver<Option<IncidentView>> {
        self.view.clone()
    }

    /// Latest published view
    pub fn current(&self) -> Option<IncidentView> {
        self.view.borrow().clone()
    }
}

/// Resources held for the selected incident
struct Subscription {
    ctx: SubscriptionContext,
    state: MergeState,
    tasks: Vec<JoinHandle<()>>,
    last_error: Option<MutraceError>,
    dropped_messages: usize,
}

impl Subscription {
    fn release(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Event loop owning the authoritative post collection
pub struct Viewer {
    source: Arc<dyn IncidentSource>,
    config: EngineConfig,
    queue: mpsc::WeakSender<Envelope>,
    view: watch::Sender<Option<IncidentView>>,
    subscription: Option<Subscription>,
    generation: u64,
}

impl Viewer {
    /// Start the event loop on the current runtime
    ///
    /// The loop ends on [`Command::Shutdown`] or once every handle has been
    /// dropped and no subscription task is left.
    pub fn spawn(
        source: Arc<dyn IncidentSource>,
        config: EngineConfig,
    ) -> (ViewerHandle, JoinHandle<()>) {
        let (queue_tx, queue_rx) = mpsc::channel(config.session.channel_capacity.max(1));
        let (view_tx, view_rx) = watch::channel(None);

        let viewer = Viewer {
            source,
            config,
            queue: queue_tx.downgrade(),
            view: view_tx,
            subscription: None,
            generation: 0,
        };
        let task = tokio::spawn(viewer.run(queue_rx));

        (
            ViewerHandle {
                queue: queue_tx,
                view: view_rx,
            },
            task,
        )
    }

    async fn run(mut self, mut queue: mpsc::Receiver<Envelope>) {
        tracing::info!("viewer started");
        while let Some(envelope) = queue.recv().await {
            if let Envelope::Command(Command::Shutdown) = envelope {
                break;
            }
            self.handle(envelope);
        }
        self.subscription = None;
        tracing::info!("viewer stopped");
    }

    fn owns(&self, ctx: &SubscriptionContext) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|sub| sub.ctx.owns(&ctx.incident_id, ctx.generation))
    }

    fn handle(&mut self, envelope: Envelope) {
        if let Some(ctx) = envelope.context() {
            if !self.owns(ctx) {
                let current = self.subscription.as_ref().map(|sub| &sub.ctx);
                let err = stale_response(current, ctx);
                tracing::debug!(
                    incident_id = %ctx.incident_id,
                    generation = ctx.generation,
                    err_code = err.code(),
                    "{}",
                    err
                );
                return;
            }
        }

        match envelope {
            Envelope::Command(Command::Select(incident_id)) => self.select(incident_id),
            Envelope::Command(Command::Deselect) => self.deselect(),
            Envelope::Command(Command::Reconnect) => self.reconnect(),
            Envelope::Command(Command::Shutdown) => {}
            Envelope::ChannelOpened(ctx) => self.on_channel_opened(ctx),
            Envelope::ChannelFrame(_, raw) => self.on_frame(&raw),
            Envelope::ChannelClosed(ctx) => self.on_transport_failure(MutraceError::TransportError {
                incident_id: ctx.incident_id,
                reason: "live channel closed".to_string(),
            }),
            Envelope::Snapshot(_, Ok(posts)) => {
                if self.merge(MergeEvent::SnapshotLoaded(posts)) {
                    self.publish();
                }
            }
            Envelope::Snapshot(_, Err(err)) | Envelope::SubscribeFailed(_, err) => {
                self.on_transport_failure(err)
            }
        }
    }

    fn select(&mut self, incident_id: String) {
        let started = Instant::now();
        log_op_start!("select_incident", incident_id = incident_id.as_str());

        // Dropping the old subscription aborts its tasks before the new one starts.
        self.subscription = None;
        self.subscribe(MergeState::new(incident_id.clone()));
        self.publish();

        log_op_end!(
            "select_incident",
            duration_ms = started.elapsed().as_millis() as u64,
            incident_id = incident_id.as_str()
        );
    }

    fn deselect(&mut self) {
        if let Some(sub) = self.subscription.take() {
            tracing::info!(incident_id = %sub.ctx.incident_id, "incident released");
        }
        self.view.send_replace(None);
    }

    fn reconnect(&mut self) {
        let Some(mut sub) = self.subscription.take() else {
            tracing::debug!("reconnect without a selected incident");
            return;
        };
        sub.release();
        // Subscription implements Drop, so the state is cloned out rather than moved.
        let (state, _) = apply(sub.state.clone(), MergeEvent::Disconnected);
        tracing::info!(incident_id = %state.incident_id(), "reconnecting");
        self.subscribe(state);
        self.publish();
    }

    /// Acquire a new generation for `state` and start opening its channel
    fn subscribe(&mut self, state: MergeState) {
        self.generation += 1;
        let ctx = SubscriptionContext::new(state.incident_id(), self.generation);
        tracing::info!(
            incident_id = %ctx.incident_id,
            generation = ctx.generation,
            trace_id = %ctx.trace_id,
            "subscription acquired"
        );

        let mut sub = Subscription {
            ctx: ctx.clone(),
            state,
            tasks: Vec::new(),
            last_error: None,
            dropped_messages: 0,
        };
        if let Some(queue) = self.queue.upgrade() {
            sub.tasks
                .push(tokio::spawn(forward_channel(self.source.clone(), ctx, queue)));
        }
        self.subscription = Some(sub);
    }

    fn on_channel_opened(&mut self, ctx: SubscriptionContext) {
        if self.merge(MergeEvent::Connected) {
            self.publish();
        }

        let Some(queue) = self.queue.upgrade() else {
            return;
        };
        let source = self.source.clone();
        let fetch = tokio::spawn(async move {
            let result = source.fetch_posts(&ctx.incident_id).await;
            let _ = queue.send(Envelope::Snapshot(ctx, result)).await;
        });
        if let Some(sub) = self.subscription.as_mut() {
            sub.tasks.push(fetch);
        }
    }

    fn on_frame(&mut self, raw: &str) {
        match decode_message(raw) {
            Ok(ChannelMessage::NewPost(post)) => {
                if self.merge(MergeEvent::PostReceived(post)) {
                    self.publish();
                }
            }
            Ok(ChannelMessage::Ignored { kind }) => {
                tracing::trace!(kind = %kind, "ignoring channel message");
            }
            Err(err) => {
                log_op_error!("decode_message", err, duration_ms = 0);
                if let Some(sub) = self.subscription.as_mut() {
                    sub.dropped_messages += 1;
                }
                self.publish();
            }
        }
    }

    fn on_transport_failure(&mut self, err: MutraceError) {
        let Some(sub) = self.subscription.as_mut() else {
            return;
        };
        tracing::warn!(
            incident_id = %sub.ctx.incident_id,
            generation = sub.ctx.generation,
            error = %err,
            "transport failure; keeping last known posts"
        );
        sub.release();
        sub.last_error = Some(err);
        self.merge(MergeEvent::Disconnected);
        self.publish();
    }

    /// Fold `event` into the subscription; true when the view must be republished
    fn merge(&mut self, event: MergeEvent) -> bool {
        let Some(sub) = self.subscription.as_mut() else {
            return false;
        };
        let phase_before = sub.state.phase();
        let placeholder = MergeState::new(sub.state.incident_id());
        let (state, outcome) = apply(std::mem::replace(&mut sub.state, placeholder), event);
        sub.state = state;

        if let Some(err) = outcome.as_error() {
            let err = ExError::from(err);
            tracing::debug!(
                post_id = err.post_id().unwrap_or_default(),
                err_code = err.code(),
                "{}",
                err
            );
        }
        let phase_after = sub.state.phase();
        if phase_after == ConnectionPhase::Live && phase_before != ConnectionPhase::Live {
            sub.last_error = None;
        }

        outcome.changed() || phase_after != phase_before
    }

    fn publish(&self) {
        let view = self.subscription.as_ref().map(|sub| {
            let mut view = IncidentView::rebuild(&sub.state, sub.ctx.generation, &self.config);
            view.last_error = sub.last_error.clone();
            view.dropped_messages = sub.dropped_messages;
            view
        });
        self.view.send_replace(view);
    }
}

/// Classify a response whose subscription has been released
fn stale_response(current: Option<&SubscriptionContext>, stale: &SubscriptionContext) -> ExError {
    let expected = current.map_or_else(|| "none".to_string(), ToString::to_string);
    let err = MutraceError::IncidentMismatch {
        expected: expected.clone(),
        actual: stale.incident_id.clone(),
    };
    ExError::from(err)
        .with_trace_id(stale.trace_id.clone())
        .with_message(format!(
            "response for {} arrived after subscription moved to {}",
            stale, expected
        ))
}

/// Open the live channel and forward its frames to the queue
async fn forward_channel(
    source: Arc<dyn IncidentSource>,
    ctx: SubscriptionContext,
    queue: mpsc::Sender<Envelope>,
) {
    let mut channel = match source.open_channel(&ctx.incident_id).await {
        Ok(channel) => channel,
        Err(err) => {
            let _ = queue.send(Envelope::SubscribeFailed(ctx, err)).await;
            return;
        }
    };

    if queue
        .send(Envelope::ChannelOpened(ctx.clone()))
        .await
        .is_err()
    {
        return;
    }
    while let Some(raw) = channel.recv().await {
        if queue
            .send(Envelope::ChannelFrame(ctx.clone(), raw))
            .await
            .is_err()
        {
            return;
        }
    }
    let _ = queue.send(Envelope::ChannelClosed(ctx)).await;
}
