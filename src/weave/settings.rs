use crate::jvm::code::MethodRef;
use crate::jvm::{ArrayType, BinaryName, FieldType, MethodDescriptor, RefType, UnqualifiedName};

/// What to weave into a method, and where
#[derive(Clone, Debug)]
pub struct TriggerSpec {
    /// Name of the rule (only used in diagnostics)
    pub rule_name: String,

    /// Key identifying the rule at runtime, passed as the first argument to the hook
    pub rule_key: String,

    /// Exception class the rule is interested in
    ///
    /// This is advisory: throws are matched purely by occurrence, since the type of the value
    /// being thrown is not known without running a verifier over the method.
    pub exception_class: Option<BinaryName>,

    /// The trigger goes before the explicit throw with this (1-based) occurrence number
    pub count: usize,

    /// Static method called to fire the rule
    pub hook: TriggerHook,
}

impl TriggerSpec {
    /// Trigger before the `count`-th explicit throw, calling the default hook
    pub fn new(
        rule_name: impl Into<String>,
        rule_key: impl Into<String>,
        count: usize,
    ) -> TriggerSpec {
        TriggerSpec {
            rule_name: rule_name.into(),
            rule_key: rule_key.into(),
            exception_class: None,
            count,
            hook: TriggerHook::rule_execute(),
        }
    }
}

/// Static method receiving `(String key, Object receiver, Object[] arguments)` and returning
/// `void`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerHook {
    pub class: BinaryName,
    pub name: UnqualifiedName,
}

impl TriggerHook {
    /// `org.jboss.byteman.rule.Rule.execute`
    pub fn rule_execute() -> TriggerHook {
        TriggerHook {
            class: BinaryName::RULE,
            name: UnqualifiedName::EXECUTE,
        }
    }

    /// `(Ljava/lang/String;Ljava/lang/Object;[Ljava/lang/Object;)V`
    pub fn descriptor() -> MethodDescriptor<BinaryName> {
        MethodDescriptor {
            parameters: vec![
                FieldType::object(BinaryName::STRING),
                FieldType::object(BinaryName::OBJECT),
                FieldType::Ref(RefType::ObjectArray(ArrayType {
                    additional_dimensions: 0,
                    element_type: BinaryName::OBJECT,
                })),
            ],
            return_type: None,
        }
    }

    pub fn method_ref(&self) -> MethodRef {
        MethodRef {
            class: self.class.clone(),
            name: self.name.clone(),
            descriptor: TriggerHook::descriptor(),
            is_interface: false,
        }
    }
}
