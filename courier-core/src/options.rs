//! Mediator options. Deserializable so host applications can keep them in their own config.

use serde::{Deserialize, Serialize};

/// How the validators bound to one request are driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStrategy {
    /// Poll all validators together and wait for every one of them.
    #[default]
    Concurrent,
    /// Await validators one after another, in resolution order.
    Sequential,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MediatorOptions {
    pub validation: ValidationStrategy,
}

impl MediatorOptions {
    pub fn validation(mut self, strategy: ValidationStrategy) -> Self {
        self.validation = strategy;
        self
    }
}
