use super::Error;
use crate::jvm::{
    BinaryName, MethodAccessFlags, MethodDescriptor, Name, ParseDescriptor, RenderDescriptor,
    UnqualifiedName,
};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Method (or constructor) being rewritten
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteTarget {
    /// Class declaring the method
    pub class: BinaryName,

    pub name: UnqualifiedName,

    pub descriptor: MethodDescriptor<BinaryName>,

    pub access_flags: MethodAccessFlags,

    /// Classes in the `throws` clause
    pub exceptions: Vec<BinaryName>,
}

impl RewriteTarget {
    /// Build a target from names and a descriptor in internal form
    ///
    /// ```
    /// use throw_trigger::jvm::MethodAccessFlags;
    /// use throw_trigger::weave::RewriteTarget;
    ///
    /// let target = RewriteTarget::parse(
    ///     "org/example/Calc",
    ///     "compute",
    ///     "(I)I",
    ///     MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
    ///     &["java/io/IOException"],
    /// ).unwrap();
    /// assert!(target.is_static());
    /// assert_eq!(target.to_string(), "org/example/Calc.compute (I)I");
    /// ```
    pub fn parse(
        class: &str,
        name: &str,
        descriptor: &str,
        access_flags: MethodAccessFlags,
        exceptions: &[&str],
    ) -> Result<RewriteTarget, Error> {
        let malformed = |reason: String| Error::MalformedTarget {
            target: format!("{}.{} {}", class, name, descriptor),
            reason,
        };

        let class = BinaryName::from_string(class.to_owned()).map_err(malformed)?;
        let name = UnqualifiedName::from_string(name.to_owned()).map_err(malformed)?;
        let descriptor =
            MethodDescriptor::parse(descriptor).map_err(|err| malformed(err.to_string()))?;
        let exceptions = exceptions
            .iter()
            .map(|exception| BinaryName::from_string((*exception).to_owned()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(malformed)?;

        Ok(RewriteTarget {
            class,
            name,
            descriptor,
            access_flags,
            exceptions,
        })
    }

    /// Is this an instance initializer?
    pub fn is_constructor(&self) -> bool {
        self.name == UnqualifiedName::INIT
    }

    /// Is there no receiver?
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }
}

/// Renders as `class.method descriptor`
impl Display for RewriteTarget {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{}.{} {}",
            self.class,
            self.name,
            self.descriptor.render()
        )
    }
}
