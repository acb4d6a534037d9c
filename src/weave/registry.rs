use super::RewriteTarget;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::{Mutex, MutexGuard};

/// Receives the type information of a method right before a trigger is woven into it
///
/// The rule engine needs to know the exact signature of the method a rule fires in, in order to
/// type-check the rule against the receiver and arguments it will be passed at runtime.
pub trait RuleRegistry {
    fn register_type_info(
        &self,
        rule_key: &str,
        target: &RewriteTarget,
    ) -> Result<(), RegistrationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// No rule was declared with this key
    UnknownRule(String),

    /// The rule already has type information for a different method
    ConflictingTarget {
        rule_key: String,
        registered: String,
    },

    /// The registry rejected the registration for some other reason
    Rejected(String),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            RegistrationError::UnknownRule(key) => write!(f, "no rule with key '{}'", key),
            RegistrationError::ConflictingTarget {
                rule_key,
                registered,
            } => write!(
                f,
                "rule '{}' is already bound to {}",
                rule_key, registered
            ),
            RegistrationError::Rejected(reason) => f.write_str(reason),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// In-memory registry of rules and the methods they have been woven into
///
/// Rules must be declared (by key) before a rewrite registers type info against them. A rule is
/// bound to at most one method: registering the same method again is accepted, registering a
/// different one is an error.
#[derive(Debug, Default)]
pub struct TypeInfoRegistry {
    rules: Mutex<HashMap<String, Option<RewriteTarget>>>,
}

impl TypeInfoRegistry {
    pub fn new() -> TypeInfoRegistry {
        TypeInfoRegistry::default()
    }

    /// Declare a rule, so that type info can later be registered against it
    ///
    /// Declaring an already declared rule does nothing.
    pub fn declare(&self, rule_key: impl Into<String>) {
        self.lock().entry(rule_key.into()).or_insert(None);
    }

    /// Type info registered against a rule so far
    pub fn type_info(&self, rule_key: &str) -> Option<RewriteTarget> {
        self.lock().get(rule_key).cloned().flatten()
    }

    /// Number of rules which have type info
    pub fn bound_rules(&self) -> usize {
        self.lock().values().filter(|target| target.is_some()).count()
    }

    fn lock(&self) -> MutexGuard<HashMap<String, Option<RewriteTarget>>> {
        // Entries are only ever replaced whole, so a poisoned map is still consistent
        self.rules
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RuleRegistry for TypeInfoRegistry {
    fn register_type_info(
        &self,
        rule_key: &str,
        target: &RewriteTarget,
    ) -> Result<(), RegistrationError> {
        let mut rules = self.lock();
        let slot = rules
            .get_mut(rule_key)
            .ok_or_else(|| RegistrationError::UnknownRule(rule_key.to_owned()))?;
        match slot {
            Some(registered) if *registered != *target => Err(RegistrationError::ConflictingTarget {
                rule_key: rule_key.to_owned(),
                registered: registered.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                *slot = Some(target.clone());
                Ok(())
            }
        }
    }
}
