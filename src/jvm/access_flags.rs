use bitflags::bitflags;

bitflags! {
    /// Access flags on methods, as found in `method_info`
    ///
    /// See <https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1>
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;

        /// No receiver in local 0
        const STATIC = 0x0008;
        const FINAL = 0x0010;

        /// Whole body runs with the receiver's (or class') monitor held
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

impl MethodAccessFlags {
    /// Does a method with these flags have a body that can be rewritten?
    pub fn has_code(&self) -> bool {
        !self.intersects(MethodAccessFlags::NATIVE | MethodAccessFlags::ABSTRACT)
    }
}
