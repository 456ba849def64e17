#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use notification_service::{
    clients::mailer::Mailer,
    dispatcher::Dispatcher,
    models::{
        mail::{MailMessage, Sender, SendReceipt},
        retry::RetryConfig,
    },
    queue::RetryQueue,
};

/// A mailer that fails according to a script, then succeeds.
#[derive(Default)]
pub struct ScriptedMailer {
    failures: Mutex<VecDeque<String>>,
    always_fail: bool,
    calls: AtomicU32,
    sent: Mutex<Vec<MailMessage>>,
}

impl ScriptedMailer {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_times(times: usize) -> Arc<Self> {
        let failures = (0..times)
            .map(|i| format!("Transport error #{}", i + 1))
            .collect();

        Arc::new(Self {
            failures: Mutex::new(failures),
            ..Self::default()
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Arc::new(Self {
            always_fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for ScriptedMailer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn send_mail(&self, message: &MailMessage) -> Result<SendReceipt, Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.always_fail {
            return Err(anyhow!("Connection refused"));
        }

        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(anyhow!(error));
        }

        self.sent.lock().unwrap().push(message.clone());

        Ok(SendReceipt {
            message_id: format!("<msg-{}@test.local>", call),
        })
    }

    async fn verify(&self) -> Result<(), Error> {
        Ok(())
    }
}

pub fn sender() -> Sender {
    Sender {
        email: "noreply@crimereport.local".to_string(),
        name: "Crime Reporting System".to_string(),
    }
}

pub fn dispatcher_with(mailer: Arc<ScriptedMailer>, retry_config: RetryConfig) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        mailer,
        Arc::new(RetryQueue::new()),
        sender(),
        retry_config,
    ))
}

pub fn dispatcher(mailer: Arc<ScriptedMailer>) -> Arc<Dispatcher> {
    dispatcher_with(mailer, RetryConfig::default())
}
