//! In-memory row source for tests.
//!
//! [`MemoryConnection`], [`MemoryStatement`] and [`MemoryCursor`] implement
//! the collaborator traits over fixed rows. Faults can be injected at every
//! step, and a shared [`Probe`] records what was prepared, bound, read and
//! released so tests can assert on it.
//!
//! ```ignore
//! let conn = MemoryConnection::new()
//!     .with_result("SELECT id FROM users", vec![vec![Value::Int(1)]])
//!     .with_fault(Fault::Bind);
//! ```

use crate::error::AccessError;
use crate::source::{Bind, Connection, Cursor, Row, Statement};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Where an injected failure happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Prepare,
    Bind,
    Execute,
    Advance,
    Value,
    CursorClose,
    StatementClose,
}

#[derive(Debug, Default)]
struct ProbeLog {
    prepared: Vec<String>,
    bound: Vec<(usize, Value)>,
    touched: Vec<usize>,
    executed: usize,
    advances: usize,
    cursor_closes: usize,
    statement_closes: usize,
}

/// Shared record of collaborator calls. Clones observe the same log.
#[derive(Debug, Clone, Default)]
pub struct Probe(Rc<RefCell<ProbeLog>>);

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL text passed to `prepare`, in order.
    pub fn prepared(&self) -> Vec<String> {
        self.0.borrow().prepared.clone()
    }

    /// `(index, value)` pairs passed to `bind`, in order.
    pub fn bound(&self) -> Vec<(usize, Value)> {
        self.0.borrow().bound.clone()
    }

    /// Column indices read, in order, including `is_null` checks.
    pub fn touched(&self) -> Vec<usize> {
        self.0.borrow().touched.clone()
    }

    pub fn clear_touched(&self) {
        self.0.borrow_mut().touched.clear();
    }

    pub fn executed(&self) -> usize {
        self.0.borrow().executed
    }

    pub fn advances(&self) -> usize {
        self.0.borrow().advances
    }

    /// Cursor release attempts, failed ones included.
    pub fn cursor_closes(&self) -> usize {
        self.0.borrow().cursor_closes
    }

    /// Statement release attempts, failed ones included.
    pub fn statement_closes(&self) -> usize {
        self.0.borrow().statement_closes
    }

    fn log(&self) -> std::cell::RefMut<'_, ProbeLog> {
        self.0.borrow_mut()
    }
}

fn fault(faults: &[Fault], which: Fault) -> Result<(), AccessError> {
    if faults.contains(&which) {
        Err(AccessError::new(format!("injected {:?} fault", which)))
    } else {
        Ok(())
    }
}

fn lookup(values: &[Value], column: usize) -> Result<Value, AccessError> {
    column
        .checked_sub(1)
        .and_then(|i| values.get(i))
        .cloned()
        .ok_or_else(|| {
            AccessError::new(format!(
                "column index {} out of range 1..={}",
                column,
                values.len()
            ))
        })
}

/// Parse a JSON array of row arrays, e.g. `[[1, "a"], [2, null]]`.
pub fn rows_from_json(json: &str) -> Result<Vec<Vec<Value>>, serde_json::Error> {
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(json)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(Value::from).collect())
        .collect())
}

/// A single standalone row.
#[derive(Debug, Clone)]
pub struct MemoryRow {
    values: Vec<Value>,
    probe: Probe,
}

impl MemoryRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            probe: Probe::new(),
        }
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Row for MemoryRow {
    fn value(&self, column: usize) -> Result<Value, AccessError> {
        self.probe.log().touched.push(column);
        lookup(&self.values, column)
    }
}

/// Forward-only cursor over fixed rows.
#[derive(Debug)]
pub struct MemoryCursor {
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    probe: Probe,
    faults: Vec<Fault>,
}

impl MemoryCursor {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows: rows.into(),
            current: None,
            probe: Probe::new(),
            faults: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(rows_from_json(json)?))
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Record into `probe` instead of a private one.
    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Row for MemoryCursor {
    fn value(&self, column: usize) -> Result<Value, AccessError> {
        self.probe.log().touched.push(column);
        fault(&self.faults, Fault::Value)?;
        match &self.current {
            Some(values) => lookup(values, column),
            None => Err(AccessError::new("cursor is not on a row")),
        }
    }
}

impl Cursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool, AccessError> {
        self.probe.log().advances += 1;
        fault(&self.faults, Fault::Advance)?;
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn close(&mut self) -> Result<(), AccessError> {
        self.probe.log().cursor_closes += 1;
        fault(&self.faults, Fault::CursorClose)?;
        self.rows.clear();
        self.current = None;
        Ok(())
    }
}

/// Statement that executes into a [`MemoryCursor`] over its rows.
#[derive(Debug)]
pub struct MemoryStatement {
    rows: Vec<Vec<Value>>,
    probe: Probe,
    faults: Vec<Fault>,
}

impl MemoryStatement {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows,
            probe: Probe::new(),
            faults: Vec::new(),
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Bind for MemoryStatement {
    fn bind(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        fault(&self.faults, Fault::Bind)?;
        self.probe.log().bound.push((index, value));
        Ok(())
    }
}

impl Statement for MemoryStatement {
    type Cursor = MemoryCursor;

    fn execute(&mut self) -> Result<MemoryCursor, AccessError> {
        self.probe.log().executed += 1;
        fault(&self.faults, Fault::Execute)?;
        Ok(MemoryCursor {
            rows: self.rows.clone().into(),
            current: None,
            probe: self.probe.clone(),
            faults: self.faults.clone(),
        })
    }

    fn close(&mut self) -> Result<(), AccessError> {
        self.probe.log().statement_closes += 1;
        fault(&self.faults, Fault::StatementClose)
    }
}

/// Connection serving registered results by exact SQL text.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    results: HashMap<String, Vec<Vec<Value>>>,
    probe: Probe,
    faults: Vec<Fault>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, sql: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        self.results.insert(sql.into(), rows);
        self
    }

    /// Faults are inherited by every statement and cursor this connection
    /// creates.
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Connection for MemoryConnection {
    type Statement = MemoryStatement;

    fn prepare(&mut self, sql: &str) -> Result<MemoryStatement, AccessError> {
        self.probe.log().prepared.push(sql.to_string());
        fault(&self.faults, Fault::Prepare)?;
        let rows = self
            .results
            .get(sql)
            .cloned()
            .ok_or_else(|| AccessError::new(format!("no result registered for: {}", sql)))?;
        Ok(MemoryStatement {
            rows,
            probe: self.probe.clone(),
            faults: self.faults.clone(),
        })
    }
}
