//! In-memory backend for exercising the gateway and explorer without a server.
//!
//! [`MockConnector`] counts live sessions, records every statement in the
//! order it reached a session, and answers `select` calls from a scripted
//! queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dialect::DialectProfile;
use crate::error::ExplorerError;
use crate::explorer::Explorer;
use crate::gateway::{Connector, Gateway, Session};
use crate::results::ResultSet;
use crate::types::{DatabaseType, SqlValue};

/// One scripted answer to a `select`.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Rows(ResultSet),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    open: AtomicUsize,
    total: AtomicUsize,
    attempts: AtomicUsize,
    closes: AtomicUsize,
    statements: Mutex<Vec<String>>,
    params: Mutex<Vec<Vec<SqlValue>>>,
    databases: Mutex<Vec<Option<String>>>,
    responses: Mutex<VecDeque<MockResponse>>,
}

#[derive(Debug, Clone)]
pub struct MockConnector {
    database_type: DatabaseType,
    connect_error: Option<String>,
    batch_error: Option<String>,
    state: Arc<MockState>,
}

impl MockConnector {
    #[must_use]
    pub fn new(database_type: DatabaseType) -> Self {
        Self {
            database_type,
            connect_error: None,
            batch_error: None,
            state: Arc::new(MockState::default()),
        }
    }

    /// Every `connect` fails with `message`.
    #[must_use]
    pub fn failing_connect(mut self, message: &str) -> Self {
        self.connect_error = Some(message.to_string());
        self
    }

    /// Every `execute_batch` fails with `message`.
    #[must_use]
    pub fn failing_batch(mut self, message: &str) -> Self {
        self.batch_error = Some(message.to_string());
        self
    }

    /// Queue a result for the next unanswered `select`.
    #[must_use]
    pub fn push_rows(self, columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        let mut rs = ResultSet::with_columns(
            columns.iter().map(|c| (*c).to_string()).collect(),
            rows.len(),
        );
        for row in rows {
            rs.add_row_values(row);
        }
        self.push(MockResponse::Rows(rs))
    }

    /// Queue a driver failure for the next unanswered `select`.
    #[must_use]
    pub fn push_error(self, message: &str) -> Self {
        self.push(MockResponse::Fail(message.to_string()))
    }

    fn push(self, response: MockResponse) -> Self {
        lock(&self.state.responses).push_back(response);
        self
    }

    /// Build an explorer on top of a clone of this connector.
    #[must_use]
    pub fn explorer(&self) -> Explorer {
        let gateway = Gateway::new(
            Arc::new(self.clone()),
            DialectProfile::for_database(self.database_type),
        );
        Explorer::new(gateway)
    }

    /// Sessions currently open.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.state.open.load(Ordering::SeqCst)
    }

    /// Sessions successfully opened so far.
    #[must_use]
    pub fn total_connections(&self) -> usize {
        self.state.total.load(Ordering::SeqCst)
    }

    /// `connect` calls, successful or not.
    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    /// Sessions closed through `Session::close` rather than dropped.
    #[must_use]
    pub fn explicit_closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Statements in the order sessions received them, batches included.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        lock(&self.state.statements).clone()
    }

    /// Parameters bound to each `select`, in order.
    #[must_use]
    pub fn bound_params(&self) -> Vec<Vec<SqlValue>> {
        lock(&self.state.params).clone()
    }

    /// The database each successful `connect` targeted.
    #[must_use]
    pub fn databases(&self) -> Vec<Option<String>> {
        lock(&self.state.databases).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Connector for MockConnector {
    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn Session>, ExplorerError> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.connect_error {
            return Err(ExplorerError::ConnectionError(message.clone()));
        }
        self.state.open.fetch_add(1, Ordering::SeqCst);
        self.state.total.fetch_add(1, Ordering::SeqCst);
        lock(&self.state.databases).push(database.map(str::to_string));
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
            batch_error: self.batch_error.clone(),
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
    batch_error: Option<String>,
}

#[async_trait]
impl Session for MockSession {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), ExplorerError> {
        lock(&self.state.statements).push(sql.to_string());
        match &self.batch_error {
            Some(message) => Err(ExplorerError::ExecutionError(message.clone())),
            None => Ok(()),
        }
    }

    async fn select(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, ExplorerError> {
        lock(&self.state.statements).push(sql.to_string());
        lock(&self.state.params).push(params.to_vec());
        match lock(&self.state.responses).pop_front() {
            Some(MockResponse::Rows(rs)) => Ok(rs),
            Some(MockResponse::Fail(message)) => Err(ExplorerError::ExecutionError(message)),
            None => Ok(ResultSet::default()),
        }
    }

    async fn close(&mut self) -> Result<(), ExplorerError> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.state.open.fetch_sub(1, Ordering::SeqCst);
    }
}
