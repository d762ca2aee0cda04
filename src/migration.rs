use tracing::info;

use crate::convention::Conventions;
use crate::error::{MigrationError, Result};
use crate::expression::Expression;
use crate::generator::Generator;
use crate::processor::Processor;

/// One versioned unit of schema change: the expressions that move the
/// database forward and, optionally, an explicit list that moves it back.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    up: Vec<Expression>,
    down: Option<Vec<Expression>>,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: Vec::new(),
            down: None,
        }
    }

    pub fn expression(mut self, expression: impl Into<Expression>) -> Self {
        self.up.push(expression.into());
        self
    }

    /// Sets explicit rollback expressions. They run in the given order
    /// instead of the reversed `up` list.
    pub fn down(mut self, expressions: Vec<Expression>) -> Self {
        self.down = Some(expressions);
        self
    }

    pub fn up_expressions(&self) -> &[Expression] {
        &self.up
    }

    /// Validation messages from every expression, each prefixed with the
    /// expression's description.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let down = self.down.as_deref().unwrap_or_default();
        for expression in self.up.iter().chain(down) {
            let mut messages = Vec::new();
            expression.collect_validation_errors(&mut messages);
            errors.extend(
                messages
                    .into_iter()
                    .map(|message| format!("{}: {}", expression.describe(), message)),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::Invalid(errors))
        }
    }

    pub fn is_reversible(&self) -> bool {
        self.down.is_some() || self.up.iter().all(Expression::is_reversible)
    }

    /// The explicit `down` list, or every `up` expression reversed in
    /// reverse order.
    pub fn down_expressions(&self) -> Result<Vec<Expression>> {
        match &self.down {
            Some(down) => Ok(down.clone()),
            None => self.up.iter().rev().map(Expression::reverse).collect(),
        }
    }

    pub fn up_sql(&self, generator: &dyn Generator) -> Result<Vec<String>> {
        generate_all(generator, &self.up)
    }

    pub fn down_sql(&self, generator: &dyn Generator) -> Result<Vec<String>> {
        generate_all(generator, &self.down_expressions()?)
    }

    /// Returns a copy with conventional names and schemas filled in.
    pub fn apply_conventions(&self, conventions: &dyn Conventions) -> Migration {
        Migration {
            version: self.version,
            description: self.description.clone(),
            up: self
                .up
                .iter()
                .map(|e| e.apply_conventions(conventions))
                .collect(),
            down: self.down.as_ref().map(|down| {
                down.iter()
                    .map(|e| e.apply_conventions(conventions))
                    .collect()
            }),
        }
    }

    pub fn run_up(&self, processor: &mut dyn Processor) -> Result<()> {
        self.validate()?;
        info!(version = self.version, description = %self.description, "migrating up");
        for expression in &self.up {
            expression.execute_with(processor)?;
        }
        Ok(())
    }

    pub fn run_down(&self, processor: &mut dyn Processor) -> Result<()> {
        let expressions = self.down_expressions()?;
        info!(version = self.version, description = %self.description, "migrating down");
        for expression in &expressions {
            expression.execute_with(processor)?;
        }
        Ok(())
    }
}

/// Generated statements, skipping expressions that produce no SQL.
fn generate_all(generator: &dyn Generator, expressions: &[Expression]) -> Result<Vec<String>> {
    let mut statements = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let sql = generator.generate(expression)?;
        if !sql.is_empty() {
            statements.push(sql);
        }
    }
    Ok(statements)
}
