use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, warn};

use crate::{
    clients::mailer::Mailer,
    models::{
        mail::{MailMessage, Sender},
        response::DispatchOutcome,
        retry::{RetryConfig, RetryRecord, SweepReport},
        template::TemplateData,
    },
    queue::RetryQueue,
    templates,
};

/// Turns a recipient and template data into a delivered email or a queued retry.
pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    queue: Arc<RetryQueue>,
    sender: Sender,
    retry_config: RetryConfig,
}

impl Dispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        queue: Arc<RetryQueue>,
        sender: Sender,
        retry_config: RetryConfig,
    ) -> Self {
        info!(
            transport = mailer.name(),
            max_attempts = retry_config.max_attempts,
            retry_delay_ms = retry_config.retry_delay_ms,
            "Dispatcher initialized"
        );

        Self {
            mailer,
            queue,
            sender,
            retry_config,
        }
    }

    pub fn queue(&self) -> &Arc<RetryQueue> {
        &self.queue
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Sends one email. `attempt_count` is the number of attempts already made.
    pub async fn send_email(
        &self,
        recipient: &str,
        template: TemplateData,
        attempt_count: u32,
    ) -> DispatchOutcome {
        let kind = template.kind();
        let rendered = templates::render(&template);

        let message = MailMessage {
            from: self.sender.clone(),
            to: recipient.to_string(),
            subject: rendered.subject,
            html: rendered.html,
        };

        match self.mailer.send_mail(&message).await {
            Ok(receipt) => {
                info!(
                    recipient,
                    template = %kind,
                    attempt = attempt_count + 1,
                    message_id = %receipt.message_id,
                    "Email sent successfully"
                );
                DispatchOutcome::Sent {
                    message_id: receipt.message_id,
                }
            }
            Err(e) => {
                let error = e.to_string();
                let next_attempt = attempt_count + 1;

                if next_attempt < self.retry_config.max_attempts {
                    warn!(
                        recipient,
                        template = %kind,
                        attempt = next_attempt,
                        max_attempts = self.retry_config.max_attempts,
                        error = %error,
                        "Email send failed, queued for retry"
                    );

                    self.queue.enqueue(RetryRecord {
                        recipient: recipient.to_string(),
                        template,
                        attempt_count: next_attempt,
                        enqueued_at: Utc::now(),
                    });

                    DispatchOutcome::Queued { error }
                } else {
                    error!(
                        recipient,
                        template = %kind,
                        attempts = next_attempt,
                        error = %error,
                        "Email send failed after exhausting all attempts"
                    );

                    DispatchOutcome::Failed { error }
                }
            }
        }
    }

    /// Redelivers every queued record that has waited at least the retry delay.
    ///
    /// Only records present when the sweep starts are considered; failures
    /// re-enqueued here wait for the next tick.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let ready = self
            .queue
            .drain_ready(now, self.retry_config.retry_delay());

        let mut report = SweepReport {
            ready: ready.len(),
            ..SweepReport::default()
        };

        if ready.is_empty() {
            return report;
        }

        debug!(
            ready = report.ready,
            remaining = self.queue.len(),
            "Processing retry queue"
        );

        let outcomes = join_all(ready.into_iter().map(|record| async move {
            info!(
                recipient = %record.recipient,
                template = %record.template.kind(),
                attempt = record.attempt_count,
                "Retrying email"
            );
            self.send_email(&record.recipient, record.template, record.attempt_count)
                .await
        }))
        .await;

        for outcome in outcomes {
            match outcome {
                DispatchOutcome::Sent { .. } => report.delivered += 1,
                DispatchOutcome::Queued { .. } => report.requeued += 1,
                DispatchOutcome::Failed { .. } => report.dropped += 1,
            }
        }

        info!(
            delivered = report.delivered,
            requeued = report.requeued,
            dropped = report.dropped,
            "Retry sweep completed"
        );

        report
    }
}

/// Runs `sweep_at` on a fixed interval until the handle is aborted.
pub fn spawn_retry_sweep(dispatcher: Arc<Dispatcher>) -> JoinHandle<()> {
    let period = dispatcher.retry_config().sweep_interval();

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately.
        ticker.tick().await;

        info!(interval_ms = period.as_millis() as u64, "Retry sweep started");

        loop {
            ticker.tick().await;
            dispatcher.sweep_at(Utc::now()).await;
        }
    })
}
