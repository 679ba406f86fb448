//! The protection service: a tokio task that owns the engine and every host
//! binding, driven by a request channel and a sweep interval.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use lootward_core::clock::Clock;
use lootward_core::host::{Messenger, NameResolver, PermissionCheck};
use lootward_core::world::World;
use lootward_protection::application::admin::AdminCommand;
use lootward_protection::application::arbiter::ClaimVerdict;
use lootward_protection::application::context::HostContext;
use lootward_protection::application::engine::ProtectionEngine;
use lootward_protection::application::lifecycle::TriggerOutcome;
use lootward_protection::config::ConfigSource;
use lootward_protection::domain::commands::{ClaimAttempt, TriggerEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::error::ServiceError;

/// Default sweep period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

const REQUEST_BUFFER: usize = 256;

/// Host collaborators owned by the service task.
pub struct HostBindings {
    /// Objects, markers and tags.
    pub world: Box<dyn World>,
    /// Chat delivery.
    pub messenger: Arc<dyn Messenger>,
    /// Identity-to-name lookup.
    pub names: Arc<dyn NameResolver>,
    /// Override permission lookup.
    pub permissions: Arc<dyn PermissionCheck>,
}

impl HostBindings {
    fn context(&mut self) -> HostContext<'_> {
        HostContext {
            world: self.world.as_mut(),
            messenger: self.messenger.as_ref(),
            names: self.names.as_ref(),
            permissions: self.permissions.as_ref(),
        }
    }
}

enum Request {
    Trigger {
        event: TriggerEvent,
        reply: oneshot::Sender<TriggerOutcome>,
    },
    Claim {
        attempt: ClaimAttempt,
        reply: oneshot::Sender<ClaimVerdict>,
    },
    Admin {
        args: Vec<String>,
        sender_is_admin: bool,
        reply: oneshot::Sender<Vec<String>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle for submitting work to a running service.
#[derive(Clone)]
pub struct ServiceHandle {
    requests: mpsc::Sender<Request>,
}

impl ServiceHandle {
    /// Submits a trigger event.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Stopped` if the service has shut down.
    pub async fn trigger(&self, event: TriggerEvent) -> Result<TriggerOutcome, ServiceError> {
        self.call(|reply| Request::Trigger { event, reply }).await
    }

    /// Submits a claim attempt and waits for the verdict.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Stopped` if the service has shut down.
    pub async fn claim(&self, attempt: ClaimAttempt) -> Result<ClaimVerdict, ServiceError> {
        self.call(|reply| Request::Claim { attempt, reply }).await
    }

    /// Runs an administrative command and returns the reply lines.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Stopped` if the service has shut down.
    pub async fn admin(
        &self,
        args: Vec<String>,
        sender_is_admin: bool,
    ) -> Result<Vec<String>, ServiceError> {
        self.call(|reply| Request::Admin {
            args,
            sender_is_admin,
            reply,
        })
        .await
    }

    /// Stops the engine, tearing down all markers, and ends the task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Stopped` if the service had already shut down.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.call(|reply| Request::Shutdown { reply }).await
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(build(reply))
            .await
            .map_err(|_| ServiceError::Stopped)?;
        response.await.map_err(|_| ServiceError::Stopped)
    }
}

/// The service task state.
pub struct ProtectionService {
    engine: ProtectionEngine,
    bindings: HostBindings,
    config_source: Box<dyn ConfigSource>,
    clock: Arc<dyn Clock>,
    tick_period: Duration,
}

impl ProtectionService {
    #[must_use]
    pub fn new(
        engine: ProtectionEngine,
        bindings: HostBindings,
        config_source: Box<dyn ConfigSource>,
        clock: Arc<dyn Clock>,
        tick_period: Duration,
    ) -> Self {
        Self {
            engine,
            bindings,
            config_source,
            clock,
            tick_period,
        }
    }

    /// Starts the engine on a new task. The task ends on `shutdown` or once
    /// every handle has been dropped; either way the engine is stopped.
    #[must_use]
    pub fn spawn(self) -> (ServiceHandle, JoinHandle<()>) {
        let (requests, receiver) = mpsc::channel(REQUEST_BUFFER);
        let task = tokio::spawn(self.run(receiver));
        (ServiceHandle { requests }, task)
    }

    async fn run(mut self, mut requests: mpsc::Receiver<Request>) {
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.engine.start();

        loop {
            tokio::select! {
                // A due sweep runs before any queued request.
                biased;
                _ = ticker.tick() => self.sweep(),
                request = requests.recv() => match request {
                    Some(request) => {
                        if self.handle(request).is_break() {
                            break;
                        }
                    }
                    None => {
                        self.stop();
                        break;
                    }
                },
            }
        }
    }

    fn sweep(&mut self) {
        let now = self.clock.now();
        let report = self.engine.sweep(&mut self.bindings.context(), now);
        if !report.expired.is_empty() || !report.collected.is_empty() {
            debug!(
                expired = report.expired.len(),
                collected = report.collected.len(),
                rendered = report.rendered,
                skipped = report.skipped,
                "sweep finished"
            );
        }
    }

    fn handle(&mut self, request: Request) -> ControlFlow<()> {
        let now = self.clock.now();
        match request {
            Request::Trigger { event, reply } => {
                let outcome = self
                    .engine
                    .on_trigger_event(&mut self.bindings.context(), event, now);
                let _ = reply.send(outcome);
            }
            Request::Claim { attempt, reply } => {
                let verdict = self
                    .engine
                    .on_claim_attempt(&mut self.bindings.context(), attempt, now);
                let _ = reply.send(verdict);
            }
            Request::Admin {
                args,
                sender_is_admin,
                reply,
            } => {
                let lines = AdminCommand::parse(args.as_slice()).execute(
                    &mut self.engine,
                    self.config_source.as_ref(),
                    sender_is_admin,
                );
                let _ = reply.send(lines);
            }
            Request::Shutdown { reply } => {
                self.stop();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn stop(&mut self) {
        self.engine.stop(self.bindings.world.as_mut());
        info!("protection service stopped");
    }
}
