//! In-memory validators for tests and offline hosts.
//!
//! `StaticValidator` answers from a canned table keyed by document text;
//! `FailingValidator` always reports a transport failure.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ValidatorError;
use crate::models::Message;
use crate::validator::{Validator, ValidatorResponse};

/// One recorded `validate` call: document text and endpoint override.
pub type Call = (String, Option<String>);

#[derive(Debug, Default)]
pub struct StaticValidator {
    fallback: Vec<Message>,
    answers: HashMap<String, Vec<Message>>,
    calls: Mutex<Vec<Call>>,
}

impl StaticValidator {
    /// Validator answering every document with no messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer documents without a dedicated entry with `messages`.
    pub fn fallback(mut self, messages: Vec<Message>) -> Self {
        self.fallback = messages;
        self
    }

    /// Answer exactly `html` with `messages`.
    pub fn answer(mut self, html: impl Into<String>, messages: Vec<Message>) -> Self {
        self.answers.insert(html.into(), messages);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Validator for StaticValidator {
    async fn validate(
        &self,
        html: &str,
        endpoint: Option<&str>,
    ) -> Result<ValidatorResponse, ValidatorError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((html.to_string(), endpoint.map(str::to_string)));
        }
        let messages = self
            .answers
            .get(html)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        Ok(ValidatorResponse { messages })
    }
}

#[derive(Debug, Default)]
pub struct FailingValidator;

#[async_trait]
impl Validator for FailingValidator {
    async fn validate(
        &self,
        _html: &str,
        _endpoint: Option<&str>,
    ) -> Result<ValidatorResponse, ValidatorError> {
        Err(ValidatorError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "checker unreachable",
        )))
    }
}
