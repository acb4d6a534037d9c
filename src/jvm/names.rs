use std::borrow::Cow;
use std::fmt;

/// Validated name in one of the internal forms used in class files
pub trait Name: Sized + AsRef<str> {
    /// Explain why a string is not a valid name (if it isn't)
    fn check_valid(name: &str) -> Result<(), String>;

    /// Wrap an already validated string
    fn from_cow_unchecked(name: Cow<'static, str>) -> Self;

    /// Try to construct a name from a string
    fn from_string(name: String) -> Result<Self, String> {
        Self::check_valid(&name)?;
        Ok(Self::from_cow_unchecked(Cow::Owned(name)))
    }

    fn as_str(&self) -> &str {
        self.as_ref()
    }
}

macro_rules! name_type {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Hash, Eq, PartialEq)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            const fn known(value: &'static str) -> $name {
                $name(Cow::Borrowed(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_type! {
    /// Names of methods and fields
    ///
    /// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.2>
    UnqualifiedName
}

name_type! {
    /// Names of classes and interfaces, in internal form (eg. `java/lang/Object`)
    ///
    /// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.1>
    BinaryName
}

impl Name for UnqualifiedName {
    fn check_valid(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err(String::from("Unqualified name is empty"));
        }
        if let Some(c) = name.chars().find(|c| matches!(c, '.' | ';' | '[' | '/')) {
            return Err(format!("Unqualified name '{}' contains '{}'", name, c));
        }
        let special = name == "<init>" || name == "<clinit>";
        if !special && name.contains(&['<', '>'][..]) {
            return Err(format!(
                "Only '<init>' and '<clinit>' may contain angle brackets, not '{}'",
                name
            ));
        }
        Ok(())
    }

    fn from_cow_unchecked(name: Cow<'static, str>) -> Self {
        UnqualifiedName(name)
    }
}

impl Name for BinaryName {
    fn check_valid(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err(String::from("Binary name is empty"));
        }
        for segment in name.split('/') {
            if segment.contains(&['<', '>'][..]) {
                return Err(format!("Binary name '{}' contains angle brackets", name));
            }
            UnqualifiedName::check_valid(segment)
                .map_err(|err| format!("Bad segment in binary name '{}': {}", name, err))?;
        }
        Ok(())
    }

    fn from_cow_unchecked(name: Cow<'static, str>) -> Self {
        BinaryName(name)
    }
}

impl UnqualifiedName {
    pub const VALUEOF: Self = Self::known("valueOf");
    pub const EXECUTE: Self = Self::known("execute");

    // Only these may contain angle brackets
    pub const INIT: Self = Self::known("<init>");
    pub const CLINIT: Self = Self::known("<clinit>");
}

impl BinaryName {
    // Boxes for primitives
    pub const BOOLEAN: Self = Self::known("java/lang/Boolean");
    pub const BYTE: Self = Self::known("java/lang/Byte");
    pub const CHARACTER: Self = Self::known("java/lang/Character");
    pub const DOUBLE: Self = Self::known("java/lang/Double");
    pub const FLOAT: Self = Self::known("java/lang/Float");
    pub const INTEGER: Self = Self::known("java/lang/Integer");
    pub const LONG: Self = Self::known("java/lang/Long");
    pub const SHORT: Self = Self::known("java/lang/Short");

    pub const OBJECT: Self = Self::known("java/lang/Object");
    pub const STRING: Self = Self::known("java/lang/String");
    pub const THROWABLE: Self = Self::known("java/lang/Throwable");

    /// Owner of the default trigger hook
    pub const RULE: Self = Self::known("org/jboss/byteman/rule/Rule");
}
